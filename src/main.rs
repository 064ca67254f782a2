use dotenvy::dotenv;
use snafu::ResultExt as _;

use video_api::api::{self, App};
use video_api::config::Config;
use video_api::database::Database;
use video_api::error::{
    ApplicationError, ConfigLoadSnafu, ConnectDatabaseSnafu, SetupDatabaseSnafu,
};
use video_api::logger;
use video_api::store::VideoStore;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env().context(ConfigLoadSnafu)?;

    let _guard = logger::init(&config)?;

    let database = Database::connect(&config.database.url)
        .await
        .context(ConnectDatabaseSnafu)?;
    database.setup().await.context(SetupDatabaseSnafu)?;

    let app = App::new(VideoStore::new(database));
    api::serve(config.host, app).await
}
