use dutycalc_core::duty::DutyRequest;
use dutycalc_core::error::DutyError;
use rust_decimal::Decimal;

use super::Context;
use crate::output;
use crate::OutputFormat;

pub fn run(
    ctx: &Context,
    code: String,
    value: Decimal,
    country: String,
    format: OutputFormat,
) -> Result<(), DutyError> {
    let store = ctx.open_store()?;
    let policy = ctx.load_policy()?;

    let request = DutyRequest::new(code, value, country);
    let Some(comparison) = dutycalc_core::compare_duty(&store, &policy, &request)? else {
        println!("No HTS code match found for '{}'", request.code);
        return Ok(());
    };

    match format {
        OutputFormat::Json => output::json::print(&comparison),
        OutputFormat::Table => {
            for line in &comparison.breakdown {
                println!("{line}");
            }
            Ok(())
        }
    }
}
