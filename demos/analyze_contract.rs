use contract_compliance::{analyze_contract_file, ModelConfig};
use dotenv::dotenv;
use std::error::Error;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: analyze_contract <contract.pdf> <checklist.csv>");
        std::process::exit(1);
    }
    let pdf_path = Path::new(&args[1]);
    let checklist_path = Path::new(&args[2]);

    println!("📜 Analyzing contract {} ...", pdf_path.display());

    let config = ModelConfig {
        timeout_secs: Some(300),
        ..ModelConfig::from_env()
    };
    let analyzer = config.build_analyzer()?;

    let markdown = analyze_contract_file(&analyzer, checklist_path, pdf_path).await?;

    println!("✅ Contract analysis complete!\n");
    println!("{}", markdown);
    Ok(())
}
