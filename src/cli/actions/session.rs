use crate::{auth::SessionGate, cli::actions::prompt::print_navigation, cli::globals::GlobalArgs};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Execute the session gate once.
/// # Errors
/// Returns an error if the session storage cannot be used.
pub async fn execute(args: Args) -> Result<()> {
    let runtime = args.globals.runtime()?;
    let gate = SessionGate::new(runtime.api, runtime.session);

    let navigation = gate.check().await?;
    print_navigation(&navigation);
    Ok(())
}
