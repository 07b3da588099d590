use env_logger::Env;

use hexfield::HexConfig;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = hexfield::run_with_config(HexConfig::default()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
