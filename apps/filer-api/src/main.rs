use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = filer_api::Args::parse();
	filer_api::run(args).await
}
