use dutycalc_core::duty::{DutyOptions, DutyRequest};
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
    prefer_reciprocal: bool,
    exclude_reciprocal: bool,
    format: OutputFormat,
) -> Result<(), DutyError> {
    let store = ctx.open_store()?;
    let policy = ctx.load_policy()?;

    let request = DutyRequest::new(code, value, country).with_options(DutyOptions {
        prefer_reciprocal_additive: prefer_reciprocal,
        exclude_reciprocal_tariff: exclude_reciprocal,
    });
    let result = dutycalc_core::estimate_duty(&store, &policy, &request)?;

    match format {
        OutputFormat::Json => output::json::print(&result),
        OutputFormat::Table => {
            output::table::print_result(&request, &result);
            Ok(())
        }
    }
}
