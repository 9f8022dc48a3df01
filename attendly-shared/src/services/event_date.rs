use super::{new_id, now_micros};
use crate::error::{Error, Result};
use crate::models::{CreateEventDate, EventDate, UpdateEventDate};
use crate::storage::Storage;
use validator::Validate;

#[derive(Clone, Debug)]
pub struct EventDateService {
    storage: Storage,
}

impl EventDateService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn create(&self, organization_id: &str, input: CreateEventDate) -> Result<EventDate> {
        input.validate()?;

        let mut event_dates = self.storage.load_event_dates(organization_id).await?;
        let event_date = EventDate {
            id: new_id(),
            organization_id: organization_id.to_string(),
            date: input.date,
            title: input.title,
            location: input.location,
            created_at: now_micros(),
        };
        event_dates.push(event_date.clone());
        self.storage
            .save_event_dates(organization_id, &event_dates)
            .await?;
        Ok(event_date)
    }

    /// Event dates in storage order
    pub async fn get_all(&self, organization_id: &str) -> Result<Vec<EventDate>> {
        self.storage.load_event_dates(organization_id).await
    }

    pub async fn get_by_id(&self, organization_id: &str, id: &str) -> Result<Option<EventDate>> {
        let event_dates = self.get_all(organization_id).await?;
        Ok(event_dates.into_iter().find(|e| e.id == id))
    }

    pub async fn update(
        &self,
        organization_id: &str,
        id: &str,
        input: UpdateEventDate,
    ) -> Result<EventDate> {
        input.validate()?;

        let mut event_dates = self.get_all(organization_id).await?;
        let event_date = event_dates
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::not_found("event date", id))?;
        input.apply(event_date);
        let updated = event_date.clone();

        self.storage
            .save_event_dates(organization_id, &event_dates)
            .await?;
        Ok(updated)
    }

    /// Deletes an event date and the responses recorded for it
    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<()> {
        let mut event_dates = self.get_all(organization_id).await?;
        let before = event_dates.len();
        event_dates.retain(|e| e.id != id);
        if event_dates.len() == before {
            return Err(Error::not_found("event date", id));
        }

        let mut attendances = self.storage.load_attendances(organization_id).await?;
        let attendance_count = attendances.len();
        attendances.retain(|a| a.event_date_id != id);
        if attendances.len() != attendance_count {
            self.storage
                .save_attendances(organization_id, &attendances)
                .await?;
        }

        self.storage
            .save_event_dates(organization_id, &event_dates)
            .await?;
        Ok(())
    }
}
