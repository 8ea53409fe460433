//! Naming conventions shared by table-name resolution and migration announcements.

use convert_case::{Case, Casing};

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
];

/// Turns `people_have_last_names` into `PeopleHaveLastNames`.
pub fn camelize(lower_case_and_underscored: &str) -> String {
    lower_case_and_underscored.to_case(Case::UpperCamel)
}

/// Turns `PeopleHaveLastNames` into `people_have_last_names`.
pub fn underscore(camel_cased: &str) -> String {
    camel_cased.to_case(Case::Snake)
}

/// Pluralizes the last word of an underscored name.
pub fn pluralize(word: &str) -> String {
    let (head, last) = match word.rfind('_') {
        Some(pos) => word.split_at(pos + 1),
        None => ("", word),
    };

    for (singular, plural) in IRREGULAR_PLURALS {
        if last == *singular {
            return format!("{}{}", head, plural);
        }
    }

    let plural_last = if last.ends_with('s')
        || last.ends_with('x')
        || last.ends_with('z')
        || last.ends_with("ch")
        || last.ends_with("sh")
    {
        format!("{}es", last)
    } else if last.ends_with('y')
        && !last.ends_with("ay")
        && !last.ends_with("ey")
        && !last.ends_with("oy")
        && !last.ends_with("uy")
    {
        format!("{}ies", &last[..last.len() - 1])
    } else {
        format!("{}s", last)
    };
    format!("{}{}", head, plural_last)
}

/// Conventional table name for an entity type name: `Reminder` becomes `reminders`,
/// `Person` becomes `people`.
pub fn tableize(type_name: &str) -> String {
    // strip any module path, e.g. `app::models::Reminder`
    let base = type_name.rsplit("::").next().unwrap_or(type_name);
    pluralize(&underscore(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("people_have_last_names"), "PeopleHaveLastNames");
        assert_eq!(camelize("we_need_reminders"), "WeNeedReminders");
        assert_eq!(camelize(""), "");
        assert_eq!(camelize("already"), "Already");
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("PeopleHaveLastNames"), "people_have_last_names");
        assert_eq!(underscore("Reminder"), "reminder");
        assert_eq!(underscore("LineItem"), "line_item");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("reminder"), "reminders");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("people_reminder"), "people_reminders");
        assert_eq!(pluralize("person"), "people");
    }

    #[test]
    fn test_tableize() {
        assert_eq!(tableize("Reminder"), "reminders");
        assert_eq!(tableize("Person"), "people");
        assert_eq!(tableize("app::models::LineItem"), "line_items");
    }
}
