use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::database::models::Pet;
use crate::database::populate;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::handlers::{FormData, QueryParams};
use crate::media::{MediaError, MediaIntake, IMAGE_FIELD};
use crate::state::AppState;

/// Text fields a client may set when creating a pet. `imageUrl` comes from
/// the upload and `status` always starts at its default.
const CREATE_FIELDS: &[&str] = &[
    "name",
    "species",
    "breed",
    "age",
    "gender",
    "size",
    "description",
    "shelterId",
];

#[derive(Debug, Default, Deserialize)]
pub struct PetQuery {
    pub species: Option<String>,
    pub size: Option<String>,
    pub status: Option<String>,
}

impl PetQuery {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .eq_if_present("species", self.species.as_deref())
            .eq_if_present("size", self.size.as_deref())
            .eq_if_present("status", self.status.as_deref())
    }
}

/// GET /api/pets - list pets, optionally filtered, with shelters expanded
pub async fn get(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PetQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let pets = state.pets.find(&query.to_filter()).await?;
    let expanded = populate(pets, "shelterId", &state.shelters, |pet: &Pet| pet.shelter_id).await?;
    Ok(Json(expanded))
}

struct Upload {
    original_name: Option<String>,
    bytes: Bytes,
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> MediaError {
    MediaError::Multipart(err.body_text())
}

/// POST /api/pets - multipart pet fields plus exactly one `image` file
#[instrument(skip_all)]
pub async fn post(
    State(state): State<AppState>,
    FormData(mut multipart): FormData,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    let mut fields = Map::new();
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            state.media.check(&name, field.content_type())?;
            if upload.is_some() {
                return Err(MediaError::UnexpectedField(name).into());
            }
            let original_name = field.file_name().map(str::to_owned);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            upload = Some(Upload { original_name, bytes });
        } else if CREATE_FIELDS.contains(&name.as_str()) {
            let text = field.text().await.map_err(multipart_error)?;
            fields.insert(name, Value::String(text));
        }
    }

    let upload = upload.ok_or(MediaError::Missing)?;
    let file_name = state
        .media
        .next_file_name(IMAGE_FIELD, upload.original_name.as_deref());
    fields.insert(
        "imageUrl".to_string(),
        Value::String(MediaIntake::public_url(&file_name)),
    );

    let pet = Pet::from_fields(&fields)?;
    state.media.store(&file_name, &upload.bytes).await?;
    let pet = state.pets.create(pet).await?;

    info!(pet_id = %pet.id, image = %pet.image_url, "Pet created");
    Ok((StatusCode::CREATED, Json(pet)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builds_only_supplied_conditions() {
        let query = PetQuery {
            species: Some("Dog".into()),
            size: Some(String::new()),
            status: None,
        };
        let filter = query.to_filter();
        assert_eq!(filter.conditions().len(), 1);
        assert_eq!(filter.conditions()[0].field, "species");
        assert!(PetQuery::default().to_filter().is_empty());
    }
}
