use mapsketch_app_lib::AppConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to start async runtime");

    match runtime.block_on(mapsketch_app_lib::run(config)) {
        Ok(report) => {
            for path in &report.exported {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
