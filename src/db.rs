use mongodb::bson::{doc, Document};
use mongodb::{options::ClientOptions, Client};

use crate::error::AppError;
use crate::models::Food;
use crate::repository::mongo::{MongoFoods, MongoOrders, MongoUsers};

pub const FOODS_COLLECTION: &str = "Foods";
pub const ORDERS_COLLECTION: &str = "OrderedDb";
pub const USERS_COLLECTION: &str = "users";

/// Owns the shared client; built once at startup and shut down on exit.
pub struct Database {
    client: Client,
    database: mongodb::Database,
}

impl Database {
    pub async fn connect(url: &str, name: &str) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(url).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        log::info!("Pinged MongoDB deployment, using database {name}");

        let database = client.database(name);
        Ok(Database { client, database })
    }

    pub fn foods(&self) -> MongoFoods {
        MongoFoods::new(self.database.collection::<Food>(FOODS_COLLECTION))
    }

    pub fn orders(&self) -> MongoOrders {
        MongoOrders::new(self.database.collection::<Document>(ORDERS_COLLECTION))
    }

    pub fn users(&self) -> MongoUsers {
        MongoUsers::new(self.database.collection::<Document>(USERS_COLLECTION))
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        log::info!("MongoDB client shut down");
    }
}
