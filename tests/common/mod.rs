//! Common test utilities and helpers

use ncload::testing::TestContext;

pub const TEMPERATURE: &str = "#  date time lat lon value\n\
    2020-01-01 00:00:00 1.5 2.5 280.1\n\
    2020-01-01 00:00:00 1.5 3.5 281.2\n\
    2020-01-01 00:00:00 2.5 2.5 279.9\n";

pub const SALINITY: &str = "#  date time lat lon value\n\
    2020-01-01 00:00:00 1.5 2.5 35.1\n";

/// Script the extraction tool to answer for both sample features
pub fn expect_sample_features(ctx: &mut TestContext) {
    for (feature, stdout) in [("temperature", TEMPERATURE), ("salinity", SALINITY)] {
        let selector = format!("-selname,{feature}");
        ctx.runner
            .expect_command("cdo")
            .with_args(move |args: &[String]| args.contains(&selector))
            .returns_stdout(stdout)
            .finish();
    }
}
