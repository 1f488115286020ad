use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::errors::FilmorateError;
use crate::logic::models::{FilmDraft, UserDraft};

pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Cinema's birthday, releases must be strictly later.
pub fn start_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).expect("valid calendar date")
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"))
}

/// A valid user as it goes to storage: name already defaulted.
#[derive(Clone, Debug)]
pub struct ValidUser {
    pub id: Option<i32>,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct ValidFilm {
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa_id: i32,
    pub genre_ids: Vec<i32>,
}

pub fn validate_user(draft: UserDraft) -> Result<ValidUser, FilmorateError> {
    validate_user_at(draft, Local::now().date_naive())
}

pub(crate) fn validate_user_at(draft: UserDraft, today: NaiveDate) -> Result<ValidUser, FilmorateError> {
    if draft.email.trim().is_empty() {
        return Err(FilmorateError::validation("Email must not be blank"));
    }
    if !email_pattern().is_match(&draft.email) {
        return Err(FilmorateError::validation(format!(
            "Email {} is not a valid email address",
            draft.email
        )));
    }
    if draft.login.trim().is_empty() {
        return Err(FilmorateError::validation("Login must not be blank"));
    }
    if draft.login.chars().any(char::is_whitespace) {
        return Err(FilmorateError::validation("Login must not contain whitespace"));
    }
    let birthday = draft
        .birthday
        .ok_or_else(|| FilmorateError::validation("Birthday is required"))?;
    if birthday >= today {
        return Err(FilmorateError::validation("Birthday must be in the past"));
    }
    let name = match draft.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => draft.login.clone(),
    };
    Ok(ValidUser {
        id: draft.id,
        email: draft.email,
        login: draft.login,
        name,
        birthday,
    })
}

pub fn validate_film(draft: FilmDraft) -> Result<ValidFilm, FilmorateError> {
    if draft.name.trim().is_empty() {
        return Err(FilmorateError::validation("Film name must not be blank"));
    }
    if draft.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(FilmorateError::validation(format!(
            "Description must not exceed {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    let release_date = draft
        .release_date
        .ok_or_else(|| FilmorateError::validation("Release date is required"))?;
    if release_date <= start_release_date() {
        return Err(FilmorateError::validation(format!(
            "Release date must be after {}",
            start_release_date()
        )));
    }
    let duration = draft
        .duration
        .filter(|duration| *duration > 0)
        .ok_or_else(|| FilmorateError::validation("Film duration must be positive"))?;
    let mpa_id = draft
        .mpa
        .map(|mpa| mpa.id)
        .ok_or_else(|| FilmorateError::validation("MPA rating is required"))?;
    let genre_ids = draft.genre_ids().into_iter().collect();
    Ok(ValidFilm {
        id: draft.id,
        name: draft.name,
        description: draft.description,
        release_date,
        duration,
        mpa_id,
        genre_ids,
    })
}

/// Updates must name the entity they change.
pub fn require_id(id: Option<i32>, entity: &str) -> Result<i32, FilmorateError> {
    id.ok_or_else(|| FilmorateError::validation(format!("{} parameters do not contain an ID", entity)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::FilmorateErrorKind;
    use crate::logic::models::Reference;

    fn user(login: &str, name: Option<&str>) -> UserDraft {
        UserDraft {
            id: None,
            email: "mail@example.com".to_owned(),
            login: login.to_owned(),
            name: name.map(str::to_owned),
            birthday: NaiveDate::from_ymd_opt(1990, 10, 12),
        }
    }

    fn film(release: NaiveDate) -> FilmDraft {
        FilmDraft {
            id: None,
            name: "FilmName".to_owned(),
            description: "Any film description".to_owned(),
            release_date: Some(release),
            duration: Some(95),
            mpa: Some(Reference { id: 1 }),
            genres: vec![],
        }
    }

    fn is_validation(error: FilmorateError) -> bool {
        matches!(error.kind(), FilmorateErrorKind::Validation(_))
    }

    #[test]
    pub fn test_blank_name_defaults_to_login() {
        assert_eq!(validate_user(user("bob", Some("  "))).unwrap().name, "bob");
        assert_eq!(validate_user(user("bob", None)).unwrap().name, "bob");
        assert_eq!(validate_user(user("bob", Some("Bob B"))).unwrap().name, "Bob B");
    }

    #[test]
    pub fn test_login_with_whitespace_rejected() {
        assert!(is_validation(validate_user(user("bob smith", None)).unwrap_err()));
        assert!(is_validation(validate_user(user("", None)).unwrap_err()));
    }

    #[test]
    pub fn test_bad_email_rejected() {
        let mut draft = user("bob", None);
        draft.email = "mail.example.com".to_owned();
        assert!(is_validation(validate_user(draft).unwrap_err()));
    }

    #[test]
    pub fn test_birthday_must_be_in_the_past() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut draft = user("bob", None);
        draft.birthday = Some(today);
        assert!(is_validation(validate_user_at(draft.clone(), today).unwrap_err()));
        draft.birthday = today.pred_opt();
        assert!(validate_user_at(draft, today).is_ok());
    }

    #[test]
    pub fn test_release_date_boundary() {
        let epoch = NaiveDate::from_ymd_opt(1895, 12, 28).unwrap();
        assert!(is_validation(validate_film(film(epoch)).unwrap_err()));
        let next_day = NaiveDate::from_ymd_opt(1895, 12, 29).unwrap();
        assert!(validate_film(film(next_day)).is_ok());
    }

    #[test]
    pub fn test_film_field_constraints() {
        let release = NaiveDate::from_ymd_opt(1990, 10, 12).unwrap();

        let mut draft = film(release);
        draft.description = "a".repeat(201);
        assert!(is_validation(validate_film(draft).unwrap_err()));

        let mut draft = film(release);
        draft.description = "я".repeat(200);
        assert!(validate_film(draft).is_ok());

        let mut draft = film(release);
        draft.duration = Some(0);
        assert!(is_validation(validate_film(draft).unwrap_err()));

        let mut draft = film(release);
        draft.name = " ".to_owned();
        assert!(is_validation(validate_film(draft).unwrap_err()));

        let mut draft = film(release);
        draft.mpa = None;
        assert!(is_validation(validate_film(draft).unwrap_err()));
    }

    #[test]
    pub fn test_require_id() {
        assert_eq!(require_id(Some(4), "User").unwrap(), 4);
        assert!(is_validation(require_id(None, "User").unwrap_err()));
    }
}
