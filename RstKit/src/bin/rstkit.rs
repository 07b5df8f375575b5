fn main() -> anyhow::Result<()> {
    rstkit::cli::run_cli()
}
