use dutycalc_core::error::DutyError;

use super::Context;
use crate::output;
use crate::OutputFormat;

pub fn run(ctx: &Context, code: &str, format: OutputFormat) -> Result<(), DutyError> {
    let store = ctx.open_store()?;
    let Some(entry) = store.find_by_code(code)? else {
        println!("No HTS code match found for '{code}'");
        return Ok(());
    };

    match format {
        OutputFormat::Json => output::json::print(&*entry),
        OutputFormat::Table => {
            output::table::print_entry(&entry);
            Ok(())
        }
    }
}
