use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logged watch event as stored in the `movies` table.
///
/// Field order and names match the JSON listing consumed by the chart client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewingEntry {
    pub movie_title: String,
    pub viewing_date: Option<NaiveDate>, // NULL in a handful of legacy rows
    #[serde(rename = "movieURL")]
    pub movie_url: String,
    pub view_format: String,
    pub view_location: String,
    #[serde(with = "flag")]
    pub first_viewing: bool,
    pub movie_genre: String,
    pub movie_review: String,
}

/// A validated entry ready to be inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewViewing {
    pub movie_title: String,
    pub viewing_date: NaiveDate,
    #[serde(rename = "movieURL")]
    pub movie_url: String,
    pub view_format: String,
    pub view_location: String,
    pub movie_genre: String,
    pub movie_review: String,
    pub first_viewing: bool,
}

impl NewViewing {
    /// Integer representation stored in the `firstViewing` column.
    pub fn first_viewing_flag(&self) -> i8 {
        flag::to_int(self.first_viewing)
    }

    pub fn into_entry(self) -> ViewingEntry {
        ViewingEntry {
            movie_title: self.movie_title,
            viewing_date: Some(self.viewing_date),
            movie_url: self.movie_url,
            view_format: self.view_format,
            view_location: self.view_location,
            first_viewing: self.first_viewing,
            movie_genre: self.movie_genre,
            movie_review: self.movie_review,
        }
    }
}

/// An earlier viewing of a title, found while looking up its IMDb ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriorViewing {
    pub movie_title: String,
    pub movie_genre: String,
    pub viewing_date: Option<NaiveDate>,
    pub view_format: String,
    pub view_location: String,
    pub movie_review: String,
}

impl From<&ViewingEntry> for PriorViewing {
    fn from(entry: &ViewingEntry) -> Self {
        Self {
            movie_title: entry.movie_title.clone(),
            movie_genre: entry.movie_genre.clone(),
            viewing_date: entry.viewing_date,
            view_format: entry.view_format.clone(),
            view_location: entry.view_location.clone(),
            movie_review: entry.movie_review.clone(),
        }
    }
}

/// `firstViewing` travels as the integer 0/1, matching the column type.
pub mod flag {
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn to_int(value: bool) -> i8 {
        if value {
            1
        } else {
            0
        }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(to_int(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("0, 1 or a boolean")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> ViewingEntry {
        ViewingEntry {
            movie_title: "Heat".to_string(),
            viewing_date: NaiveDate::from_ymd_opt(2024, 2, 3),
            movie_url: "https://www.imdb.com/title/tt0113277/".to_string(),
            view_format: "Blu-ray".to_string(),
            view_location: "Home".to_string(),
            first_viewing: true,
            movie_genre: "Crime".to_string(),
            movie_review: "".to_string(),
        }
    }

    #[test]
    fn test_entry_serializes_with_listing_field_names() {
        let value = serde_json::to_value(entry()).unwrap();
        assert_eq!(
            value,
            json!({
                "movieTitle": "Heat",
                "viewingDate": "2024-02-03",
                "movieURL": "https://www.imdb.com/title/tt0113277/",
                "viewFormat": "Blu-ray",
                "viewLocation": "Home",
                "firstViewing": 1,
                "movieGenre": "Crime",
                "movieReview": ""
            })
        );
    }

    #[test]
    fn test_missing_date_serializes_as_null() {
        let mut e = entry();
        e.viewing_date = None;
        e.first_viewing = false;
        let value = serde_json::to_value(e).unwrap();
        assert!(value["viewingDate"].is_null());
        assert_eq!(value["firstViewing"], json!(0));
    }

    #[test]
    fn test_flag_accepts_int_or_bool() {
        let mut value = serde_json::to_value(entry()).unwrap();
        value["firstViewing"] = json!(false);
        let parsed: ViewingEntry = serde_json::from_value(value.clone()).unwrap();
        assert!(!parsed.first_viewing);

        value["firstViewing"] = json!(2);
        assert!(serde_json::from_value::<ViewingEntry>(value).is_err());
    }

    #[test]
    fn test_new_viewing_flag() {
        let new = NewViewing {
            movie_title: "Heat".to_string(),
            viewing_date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            movie_url: String::new(),
            view_format: String::new(),
            view_location: String::new(),
            movie_genre: String::new(),
            movie_review: String::new(),
            first_viewing: false,
        };
        assert_eq!(new.first_viewing_flag(), 0);
        let stored = new.into_entry();
        assert_eq!(stored.viewing_date, NaiveDate::from_ymd_opt(2024, 2, 3));
        assert!(!stored.first_viewing);
    }
}
