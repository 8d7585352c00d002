//! Write functions - replace the price-to-income collection in MongoDB

use crate::ingestion::config::Config;
use crate::ingestion::types::{PriceToIncomeDocument, WriteStats};
use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::{Client, Collection};
use tracing::info;

/// Target collection for the import
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Remove every document, returning how many were deleted
    async fn delete_all(&self) -> Result<u64>;

    async fn insert_many(&self, documents: &[PriceToIncomeDocument]) -> Result<usize>;
}

pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Build a client for the configured database. The driver connects lazily,
    /// so an unreachable server only surfaces on the first operation.
    pub async fn connect(config: &Config) -> Result<Self> {
        info!("Connecting to MongoDB...");
        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .context("Failed to create MongoDB client")?;

        let collection = client
            .database(&config.database_name)
            .collection::<Document>(&config.collection_name);

        Ok(Self { collection })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn delete_all(&self) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! {})
            .await
            .context("Failed to clear existing documents")?;

        Ok(result.deleted_count)
    }

    async fn insert_many(&self, documents: &[PriceToIncomeDocument]) -> Result<usize> {
        let docs: Vec<Document> = documents.iter().map(to_bson_document).collect();

        let result = self
            .collection
            .insert_many(docs)
            .await
            .context("Failed to insert documents")?;

        Ok(result.inserted_ids.len())
    }
}

/// Encode with the field names the reporting front end reads
pub fn to_bson_document(document: &PriceToIncomeDocument) -> Document {
    doc! {
        "year": document.month_year.clone(),
        "propertyCost": document.property_cost,
        "affordability": document.affordability,
        "annualIncome": document.annual_income,
        "sortDate": BsonDateTime::from_millis(document.sort_date.timestamp_millis()),
        "city": document.city.clone(),
        "createdAt": BsonDateTime::from_millis(document.created_at.timestamp_millis()),
        "updatedAt": BsonDateTime::from_millis(document.updated_at.timestamp_millis()),
    }
}

/// Delete everything, then insert the new set if there is one.
///
/// The two steps are not atomic: a crash in between leaves the collection
/// empty until the next run.
pub async fn replace_collection<S: DocumentStore + ?Sized>(
    store: &S,
    documents: &[PriceToIncomeDocument],
) -> Result<WriteStats> {
    let mut stats = WriteStats::default();

    stats.deleted = store.delete_all().await?;
    info!("Cleared existing data ({} documents)", stats.deleted);

    if documents.is_empty() {
        info!("No data to insert");
        return Ok(stats);
    }

    stats.inserted = store.insert_many(documents).await?;
    info!("Inserted {} records successfully.", stats.inserted);

    Ok(stats)
}
