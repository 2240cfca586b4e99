//! Add-part form.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use chronify_core::{PartNumber, PartStatus};

use crate::error::AppError;
use crate::middleware::{RequireAuth, push_notices};
use crate::models::Notice;
use crate::routes::{SelectOption, UserView};
use crate::services::{AddPartError, AddPartInput, add_part};
use crate::state::AppState;

/// Raw add-part form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct AddPartForm {
    pub part_number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub thickness: String,
    #[serde(default)]
    pub qty_per_sheet: String,
    #[serde(default)]
    pub stock_qnt: String,
    #[serde(default)]
    pub sheet_price: String,
    #[serde(default)]
    pub multiplier: String,
    #[serde(default)]
    pub status: String,
}

impl Default for AddPartForm {
    fn default() -> Self {
        Self {
            part_number: String::new(),
            description: String::new(),
            category: String::new(),
            material: String::new(),
            thickness: "0".to_string(),
            qty_per_sheet: "0".to_string(),
            stock_qnt: "0".to_string(),
            sheet_price: "0".to_string(),
            multiplier: "1".to_string(),
            status: PartStatus::Active.as_str().to_string(),
        }
    }
}

fn parse_decimal(field: &str, raw: &str, default: Decimal) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    Decimal::from_str(raw).map_err(|_| format!("{field} must be a number."))
}

impl AddPartForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the message to show next to the form.
    pub fn into_input(self) -> Result<AddPartInput, String> {
        let part_number =
            PartNumber::parse(&self.part_number).map_err(|_| "Part number is required.".to_string())?;

        let stock_raw = self.stock_qnt.trim();
        let stock_qnt = if stock_raw.is_empty() {
            0
        } else {
            stock_raw
                .parse::<i32>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or_else(|| "Stock quantity must be a whole number of 0 or more.".to_string())?
        };

        let status = if self.status.trim().is_empty() {
            PartStatus::default()
        } else {
            self.status
                .trim()
                .parse::<PartStatus>()
                .map_err(|_| "Status must be Active or Inactive.".to_string())?
        };

        Ok(AddPartInput {
            part_number,
            description: self.description.trim().to_owned(),
            category: self.category.trim().to_owned(),
            material: self.material.trim().to_owned(),
            thickness: parse_decimal("Thickness", &self.thickness, Decimal::ZERO)?,
            qty_per_sheet: parse_decimal("Qty per sheet", &self.qty_per_sheet, Decimal::ZERO)?,
            stock_qnt,
            sheet_price: parse_decimal("Sheet price", &self.sheet_price, Decimal::ZERO)?,
            multiplier: parse_decimal("Multiplier", &self.multiplier, Decimal::ONE)?,
            status,
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "parts/new.html")]
pub struct NewPartTemplate {
    pub user: Option<UserView>,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub form: AddPartForm,
    pub statuses: Vec<SelectOption>,
}

impl NewPartTemplate {
    fn new(user: UserView, notices: Vec<Notice>, form: AddPartForm) -> Self {
        let statuses = SelectOption::list(PartStatus::ALL.iter().map(|s| s.as_str()), form.status.trim());
        Self {
            user: Some(user),
            current_path: "/parts/new".to_string(),
            notices,
            form,
            statuses,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/parts/new", get(new_part))
        .route("/parts", post(create_part))
}

/// GET /parts/new
async fn new_part(RequireAuth(user): RequireAuth, session: Session) -> NewPartTemplate {
    let notices = crate::middleware::take_notices(&session).await;
    NewPartTemplate::new(UserView::from(&user), notices, AddPartForm::default())
}

/// POST /parts
#[instrument(skip_all, fields(user = %user.email(), part_number = %form.part_number.trim()))]
async fn create_part(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddPartForm>,
) -> Result<Response, AppError> {
    let view = UserView::from(&user);

    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(message) => {
            return Ok(NewPartTemplate::new(view, vec![Notice::error(message)], form).into_response());
        }
    };

    match add_part(state.store(), &user, input).await {
        Ok(part) => {
            push_notices(
                &session,
                &[Notice::success(format!(
                    "Part {} added successfully.",
                    part.part_number
                ))],
            )
            .await?;
            Ok(Redirect::to("/parts/new").into_response())
        }
        Err(e) => {
            if let AddPartError::Repository(inner) = &e {
                tracing::error!(error = %inner, "Failed to add part");
            }
            Ok(NewPartTemplate::new(view, vec![Notice::error(e.to_string())], form).into_response())
        }
    }
}
