use super::error::FilterError;
use super::filter::is_identifier;
use super::types::{text_value, FilterCondition};

/// Builds the WHERE clause for JSONB documents stored in a `"doc"` column
pub struct FilterWhere {
    param_values: Vec<String>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(
        conditions: &[FilterCondition],
        starting_param_index: usize,
    ) -> Result<(String, Vec<String>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    fn build(&mut self, conditions: &[FilterCondition]) -> Result<(String, Vec<String>), FilterError> {
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        Ok((where_clause, self.param_values.clone()))
    }

    fn build_sql_condition(&mut self, condition: &FilterCondition) -> Result<String, FilterError> {
        if !is_identifier(&condition.field) {
            return Err(FilterError::InvalidField(condition.field.clone()));
        }
        let path = format!("(\"doc\"->>'{}')", condition.field);
        match text_value(&condition.value) {
            Some(text) => Ok(format!("{} = {}", path, self.param(text))),
            None => Ok(format!("{} IS NULL", path)),
        }
    }

    fn param(&mut self, value: String) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
