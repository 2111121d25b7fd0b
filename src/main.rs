use anyhow::Result;
use clap::Parser;
use tracing::error;

use redstat::analysis::{analyze_dataset, print_analysis_results};
use redstat::utils::{setup_logging, validate_args};
use redstat::{init_default_recommendations, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    if args.init {
        return init_default_recommendations();
    }

    validate_args(&args)?;

    match analyze_dataset(&args) {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result.report())?);
            } else {
                print_analysis_results(&result, &args);
            }
            Ok(())
        }
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
