//! PostgREST client for the Supabase backend.
//!
//! One canonical client for every table the service touches: `Farm`
//! (sensor readings), `Vegetationtbl` (profiles), `FarmHistory`, and
//! `FarmGallery`. Credentials are injected from [`crate::Config`], never
//! baked in, and every request carries the `apikey` plus bearer headers
//! Supabase expects.

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};

use crate::models::{GalleryItem, HistoryEntry, SensorReading, VegetationProfile};
use crate::monitor::ReadingSource;

// ---

#[derive(Clone)]
pub struct SupabaseClient {
    // ---
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        // ---
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: Method, path_and_query: &str) -> RequestBuilder {
        // ---
        self.http
            .request(
                method,
                format!("{}/rest/v1/{}", self.base_url, path_and_query),
            )
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    // --- readings ---

    /// Newest `Farm` row, or `None` while the table is empty.
    pub async fn latest_reading(&self) -> Result<Option<SensorReading>> {
        // ---
        let rows: Vec<SensorReading> = self
            .request(Method::GET, "Farm?select=*&order=dateTime.desc&limit=1")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding Farm response")?;
        Ok(rows.into_iter().next())
    }

    // --- vegetation profiles ---

    pub async fn list_profiles(&self) -> Result<Vec<VegetationProfile>> {
        // ---
        self.request(Method::GET, "Vegetationtbl?select=*&order=name.asc")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding Vegetationtbl response")
    }

    pub async fn profile_by_id(&self, id: i64) -> Result<Option<VegetationProfile>> {
        // ---
        let rows: Vec<VegetationProfile> = self
            .request(
                Method::GET,
                &format!("Vegetationtbl?select=*&id=eq.{id}&limit=1"),
            )
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding Vegetationtbl response")?;
        Ok(rows.into_iter().next())
    }

    pub async fn create_profile(&self, profile: &VegetationProfile) -> Result<()> {
        // ---
        self.request(Method::POST, "Vegetationtbl")
            .header("Prefer", "return=minimal")
            .json(profile)
            .send()
            .await?
            .error_for_status()
            .context("creating vegetation profile")?;
        Ok(())
    }

    pub async fn update_profile(&self, id: i64, profile: &VegetationProfile) -> Result<()> {
        // ---
        self.request(Method::PATCH, &format!("Vegetationtbl?id=eq.{id}"))
            .header("Prefer", "return=minimal")
            .json(profile)
            .send()
            .await?
            .error_for_status()
            .context("updating vegetation profile")?;
        Ok(())
    }

    pub async fn delete_profile(&self, id: i64) -> Result<()> {
        // ---
        self.request(Method::DELETE, &format!("Vegetationtbl?id=eq.{id}"))
            .send()
            .await?
            .error_for_status()
            .context("deleting vegetation profile")?;
        Ok(())
    }

    // --- history ---

    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        // ---
        self.request(Method::GET, "FarmHistory?select=*&order=recordedAt.desc")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding FarmHistory response")
    }

    pub async fn add_history(&self, entry: &HistoryEntry) -> Result<()> {
        // ---
        self.request(Method::POST, "FarmHistory")
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await?
            .error_for_status()
            .context("inserting history entry")?;
        Ok(())
    }

    // --- gallery ---

    pub async fn list_gallery(&self) -> Result<Vec<GalleryItem>> {
        // ---
        self.request(Method::GET, "FarmGallery?select=*&order=date.desc")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding FarmGallery response")
    }
}

impl ReadingSource for SupabaseClient {
    async fn fetch_latest_reading(&self) -> Result<Option<SensorReading>> {
        // ---
        self.latest_reading().await
    }
}
