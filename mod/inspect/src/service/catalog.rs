use qis_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use qis_sql::Value;

use crate::model::{Category, Hospital, Region, ScoreLevel};
use super::InspectService;

pub struct CreateHospitalInput {
    pub name: String,
    pub address: Option<String>,
}

pub struct UpdateHospitalInput {
    pub name: String,
    pub address: Option<String>,
}

pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
}

pub struct UpdateCategoryInput {
    pub name: String,
    pub description: Option<String>,
}

pub struct CreateRegionInput {
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
}

pub struct UpdateRegionInput {
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
}

pub struct CreateScoreLevelInput {
    pub name: String,
    pub score: i64,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

pub struct UpdateScoreLevelInput {
    pub name: String,
    pub score: i64,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

impl InspectService {
    // ── Hospital ──

    pub fn create_hospital(&self, input: CreateHospitalInput) -> Result<Hospital, ServiceError> {
        let now = now_rfc3339();
        let record = Hospital {
            id: new_id(),
            name: input.name,
            address: input.address,
            deleted: false,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("hospitals", &record.id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("deleted", Value::Integer(0)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_hospital(&self, id: &str) -> Result<Hospital, ServiceError> {
        self.get_active_record("hospitals", id)
    }

    pub fn list_hospitals(&self, params: &ListParams) -> Result<ListResult<Hospital>, ServiceError> {
        self.list_records("hospitals", &[], params)
    }

    pub fn update_hospital(
        &self,
        id: &str,
        input: UpdateHospitalInput,
    ) -> Result<Hospital, ServiceError> {
        let mut record: Hospital = self.get_active_record("hospitals", id)?;
        let now = now_rfc3339();
        record.name = input.name;
        record.address = input.address;
        record.update_at = Some(now.clone());

        self.update_record("hospitals", id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn delete_hospital(&self, id: &str) -> Result<(), ServiceError> {
        self.soft_delete_record("hospitals", id)
    }

    // ── Category ──

    pub fn create_category(&self, input: CreateCategoryInput) -> Result<Category, ServiceError> {
        let now = now_rfc3339();
        let record = Category {
            id: new_id(),
            name: input.name,
            description: input.description,
            deleted: false,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("categories", &record.id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("deleted", Value::Integer(0)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_category(&self, id: &str) -> Result<Category, ServiceError> {
        self.get_active_record("categories", id)
    }

    pub fn list_categories(&self, params: &ListParams) -> Result<ListResult<Category>, ServiceError> {
        self.list_records("categories", &[], params)
    }

    pub fn update_category(
        &self,
        id: &str,
        input: UpdateCategoryInput,
    ) -> Result<Category, ServiceError> {
        let mut record: Category = self.get_active_record("categories", id)?;
        let now = now_rfc3339();
        record.name = input.name;
        record.description = input.description;
        record.update_at = Some(now.clone());

        self.update_record("categories", id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn delete_category(&self, id: &str) -> Result<(), ServiceError> {
        self.soft_delete_record("categories", id)
    }

    // ── Region ──

    pub fn create_region(&self, input: CreateRegionInput) -> Result<Region, ServiceError> {
        // Owning category must exist.
        let _category = self.get_category(&input.category_id)?;

        let now = now_rfc3339();
        let record = Region {
            id: new_id(),
            name: input.name,
            description: input.description,
            category_id: input.category_id,
            deleted: false,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("regions", &record.id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("category_id", Value::Text(record.category_id.clone())),
            ("deleted", Value::Integer(0)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_region(&self, id: &str) -> Result<Region, ServiceError> {
        self.get_active_record("regions", id)
    }

    pub fn list_regions(
        &self,
        params: &ListParams,
        category_id: Option<&str>,
    ) -> Result<ListResult<Region>, ServiceError> {
        let mut filters: Vec<(&str, Value)> = Vec::new();
        if let Some(cid) = category_id {
            filters.push(("category_id", Value::Text(cid.to_string())));
        }
        self.list_records("regions", &filters, params)
    }

    pub fn update_region(
        &self,
        id: &str,
        input: UpdateRegionInput,
    ) -> Result<Region, ServiceError> {
        let mut record: Region = self.get_active_record("regions", id)?;
        let _category = self.get_category(&input.category_id)?;

        let now = now_rfc3339();
        record.name = input.name;
        record.description = input.description;
        record.category_id = input.category_id;
        record.update_at = Some(now.clone());

        self.update_record("regions", id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("category_id", Value::Text(record.category_id.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn delete_region(&self, id: &str) -> Result<(), ServiceError> {
        self.soft_delete_record("regions", id)
    }

    // ── ScoreLevel ──

    pub fn create_score_level(
        &self,
        input: CreateScoreLevelInput,
    ) -> Result<ScoreLevel, ServiceError> {
        if input.lower_bound > input.upper_bound {
            return Err(ServiceError::Validation(format!(
                "lower bound {} exceeds upper bound {}",
                input.lower_bound, input.upper_bound
            )));
        }

        let now = now_rfc3339();
        let record = ScoreLevel {
            id: new_id(),
            name: input.name,
            score: input.score,
            lower_bound: input.lower_bound,
            upper_bound: input.upper_bound,
            deleted: false,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("score_levels", &record.id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("lower_bound", Value::Integer(record.lower_bound)),
            ("upper_bound", Value::Integer(record.upper_bound)),
            ("deleted", Value::Integer(0)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_score_level(&self, id: &str) -> Result<ScoreLevel, ServiceError> {
        self.get_active_record("score_levels", id)
    }

    pub fn list_score_levels(
        &self,
        params: &ListParams,
    ) -> Result<ListResult<ScoreLevel>, ServiceError> {
        self.list_records("score_levels", &[], params)
    }

    pub fn update_score_level(
        &self,
        id: &str,
        input: UpdateScoreLevelInput,
    ) -> Result<ScoreLevel, ServiceError> {
        if input.lower_bound > input.upper_bound {
            return Err(ServiceError::Validation(format!(
                "lower bound {} exceeds upper bound {}",
                input.lower_bound, input.upper_bound
            )));
        }

        let mut record: ScoreLevel = self.get_active_record("score_levels", id)?;
        let now = now_rfc3339();
        record.name = input.name;
        record.score = input.score;
        record.lower_bound = input.lower_bound;
        record.upper_bound = input.upper_bound;
        record.update_at = Some(now.clone());

        self.update_record("score_levels", id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("lower_bound", Value::Integer(record.lower_bound)),
            ("upper_bound", Value::Integer(record.upper_bound)),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn delete_score_level(&self, id: &str) -> Result<(), ServiceError> {
        self.soft_delete_record("score_levels", id)
    }
}
