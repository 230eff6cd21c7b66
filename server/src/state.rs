use std::sync::Arc;

use super::{config::Config, database::Store};

pub struct State {
    pub config: Config,
    pub store: Store,
}

impl State {
    pub fn new() -> Arc<Self> {
        let config = Config::load();
        let store = Store::open(&config.database_path).expect("Database misconfigured!");

        Arc::new(Self { config, store })
    }
}
