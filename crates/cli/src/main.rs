fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match areaclone_cli::run(std::env::args_os()) {
        Ok(status) => std::process::exit(status.code()),
        Err(error) => {
            eprintln!("{error:#}");
            std::process::exit(1);
        }
    }
}
