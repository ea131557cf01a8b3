use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

//
// ─── AVATAR ────────────────────────────────────────────────────────────────────
//

/// Profile avatar shown next to the user's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Avatar {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub emoji: String,
}

impl Avatar {
    fn new(id: &str, name: &str, kind: &str, emoji: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            kind: kind.to_owned(),
            emoji: emoji.to_owned(),
        }
    }

    /// Avatars a user can pick from. The first entry is the default.
    #[must_use]
    pub fn catalog() -> Vec<Avatar> {
        vec![
            Avatar::new("cow", "Gau Mata", "Dairy Specialist", "🐄"),
            Avatar::new("chicken", "Murgi", "Poultry Expert", "🐔"),
            Avatar::new("goat", "Bakri", "Livestock Guardian", "🐐"),
            Avatar::new("rabbit", "Khargosh", "Small Farm Helper", "🐰"),
        ]
    }

    /// Look up a catalog avatar by id.
    #[must_use]
    pub fn find(id: &str) -> Option<Avatar> {
        Self::catalog().into_iter().find(|avatar| avatar.id == id)
    }

    #[must_use]
    pub fn default_choice() -> Avatar {
        Avatar::new("cow", "Gau Mata", "Dairy Specialist", "🐄")
    }
}

//
// ─── LEARNING STATS ────────────────────────────────────────────────────────────
//

/// Aggregate learning counters kept on the user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningStats {
    #[serde(alias = "total_courses")]
    pub total_courses: u32,
    #[serde(alias = "completed_courses")]
    pub completed_courses: u32,
    #[serde(alias = "total_lessons")]
    pub total_lessons: u32,
    #[serde(alias = "completed_lessons")]
    pub completed_lessons: u32,
    #[serde(alias = "learning_streak")]
    pub learning_streak: u32,
    #[serde(alias = "knowledge_points")]
    pub knowledge_points: u32,
    #[serde(alias = "current_level")]
    pub current_level: u32,
    #[serde(alias = "next_level_points")]
    pub next_level_points: u32,
    pub certificates: u32,
}

impl Default for LearningStats {
    fn default() -> Self {
        Self {
            total_courses: 0,
            completed_courses: 0,
            total_lessons: 0,
            completed_lessons: 0,
            learning_streak: 0,
            knowledge_points: 0,
            current_level: 1,
            next_level_points: 100,
            certificates: 0,
        }
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(alias = "quest_reminders")]
    pub quest_reminders: bool,
    #[serde(alias = "community_updates")]
    pub community_updates: bool,
    #[serde(alias = "weather_alerts")]
    pub weather_alerts: bool,
    #[serde(alias = "achievement_notifications")]
    pub achievement_notifications: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            quest_reminders: true,
            community_updates: true,
            weather_alerts: true,
            achievement_notifications: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivacySettings {
    #[serde(alias = "profile_visibility")]
    pub profile_visibility: String,
    #[serde(alias = "achievement_sharing")]
    pub achievement_sharing: bool,
    #[serde(alias = "progress_sharing")]
    pub progress_sharing: bool,
    #[serde(alias = "location_sharing")]
    pub location_sharing: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visibility: "community".to_owned(),
            achievement_sharing: true,
            progress_sharing: true,
            location_sharing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: String,
    pub theme: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_owned(),
            theme: "auto".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub notifications: NotificationSettings,
    pub privacy: PrivacySettings,
    pub preferences: Preferences,
}

//
// ─── SERVER RECORD ─────────────────────────────────────────────────────────────
//

/// User record as returned by the API.
///
/// Decoding never fails for a JSON value: the record is kept as-is and read
/// field by field when mapped. Null or mistyped fields fall back to defaults.
/// Both the snake_case names the server emits and the camelCase names of a
/// previously mapped record are accepted; snake_case wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerUser {
    record: Map<String, Value>,
}

impl ServerUser {
    /// Wrap a raw record. Anything other than an object is an empty record.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(record) => Self { record },
            _ => Self::default(),
        }
    }

    fn fields(&self) -> Fields<'_> {
        Fields(Some(&self.record))
    }
}

impl<'de> Deserialize<'de> for ServerUser {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Lenient reader over an optional JSON object.
///
/// Each lookup tries the given keys in order and takes the first value of the
/// expected shape.
#[derive(Clone, Copy)]
struct Fields<'a>(Option<&'a Map<String, Value>>);

impl<'a> Fields<'a> {
    fn values(self, keys: &'a [&'a str]) -> impl Iterator<Item = &'a Value> {
        keys.iter()
            .filter_map(move |key| self.0.and_then(|record| record.get(*key)))
    }

    fn text(self, keys: &'a [&'a str]) -> Option<String> {
        self.values(keys)
            .filter_map(as_text)
            .find(|value| !value.is_empty())
    }

    fn list(self, keys: &'a [&'a str]) -> Option<Vec<String>> {
        self.values(keys)
            .filter_map(as_text_list)
            .find(|list| !list.is_empty())
    }

    fn count(self, keys: &'a [&'a str]) -> Option<u32> {
        self.values(keys).find_map(as_count)
    }

    fn flag(self, keys: &'a [&'a str]) -> Option<bool> {
        self.values(keys).find_map(Value::as_bool)
    }

    fn object(self, keys: &'a [&'a str]) -> Option<Fields<'a>> {
        self.values(keys)
            .find_map(Value::as_object)
            .map(|record| Fields(Some(record)))
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

// Non-string entries are dropped.
fn as_text_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
    )
}

// Fractions round to the nearest whole count; negatives are rejected.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => match number.as_u64() {
            Some(whole) => Some(u32::try_from(whole).unwrap_or(u32::MAX)),
            None => number
                .as_f64()
                .filter(|float| float.is_finite() && *float >= 0.0)
                .map(|float| float.round() as u32),
        },
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

impl LearningStats {
    fn read(fields: Fields<'_>, base: &Self) -> Self {
        Self {
            total_courses: fields
                .count(&["total_courses", "totalCourses"])
                .unwrap_or(base.total_courses),
            completed_courses: fields
                .count(&["completed_courses", "completedCourses"])
                .unwrap_or(base.completed_courses),
            total_lessons: fields
                .count(&["total_lessons", "totalLessons"])
                .unwrap_or(base.total_lessons),
            completed_lessons: fields
                .count(&["completed_lessons", "completedLessons"])
                .unwrap_or(base.completed_lessons),
            learning_streak: fields
                .count(&["learning_streak", "learningStreak"])
                .unwrap_or(base.learning_streak),
            knowledge_points: fields
                .count(&["knowledge_points", "knowledgePoints"])
                .unwrap_or(base.knowledge_points),
            current_level: fields
                .count(&["current_level", "currentLevel"])
                .unwrap_or(base.current_level),
            next_level_points: fields
                .count(&["next_level_points", "nextLevelPoints"])
                .unwrap_or(base.next_level_points),
            certificates: fields
                .count(&["certificates"])
                .unwrap_or(base.certificates),
        }
    }
}

impl UserSettings {
    fn read(fields: Fields<'_>, base: &Self) -> Self {
        let notifications = fields
            .object(&["notifications"])
            .unwrap_or(Fields(None));
        let privacy = fields.object(&["privacy"]).unwrap_or(Fields(None));
        let preferences = fields.object(&["preferences"]).unwrap_or(Fields(None));

        Self {
            notifications: NotificationSettings {
                quest_reminders: notifications
                    .flag(&["quest_reminders", "questReminders"])
                    .unwrap_or(base.notifications.quest_reminders),
                community_updates: notifications
                    .flag(&["community_updates", "communityUpdates"])
                    .unwrap_or(base.notifications.community_updates),
                weather_alerts: notifications
                    .flag(&["weather_alerts", "weatherAlerts"])
                    .unwrap_or(base.notifications.weather_alerts),
                achievement_notifications: notifications
                    .flag(&["achievement_notifications", "achievementNotifications"])
                    .unwrap_or(base.notifications.achievement_notifications),
            },
            privacy: PrivacySettings {
                profile_visibility: privacy
                    .text(&["profile_visibility", "profileVisibility"])
                    .unwrap_or_else(|| base.privacy.profile_visibility.clone()),
                achievement_sharing: privacy
                    .flag(&["achievement_sharing", "achievementSharing"])
                    .unwrap_or(base.privacy.achievement_sharing),
                progress_sharing: privacy
                    .flag(&["progress_sharing", "progressSharing"])
                    .unwrap_or(base.privacy.progress_sharing),
                location_sharing: privacy
                    .flag(&["location_sharing", "locationSharing"])
                    .unwrap_or(base.privacy.location_sharing),
            },
            preferences: Preferences {
                language: preferences
                    .text(&["language"])
                    .unwrap_or_else(|| base.preferences.language.clone()),
                theme: preferences
                    .text(&["theme"])
                    .unwrap_or_else(|| base.preferences.theme.clone()),
            },
        }
    }
}

/// Fallbacks used when the server record omits the avatar, stats, or settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDefaults {
    pub avatar: Avatar,
    pub learning_stats: LearningStats,
    pub settings: UserSettings,
}

impl Default for UserDefaults {
    fn default() -> Self {
        Self {
            avatar: Avatar::default_choice(),
            learning_stats: LearningStats::default(),
            settings: UserSettings::default(),
        }
    }
}

//
// ─── CLIENT USER ───────────────────────────────────────────────────────────────
//

/// Client-side projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub farm_size: String,
    pub primary_crops: Vec<String>,
    pub farming_experience: String,
    pub water_source: String,
    pub avatar: Avatar,
    pub learning_stats: LearningStats,
    pub settings: UserSettings,
}

impl User {
    /// Map a server record into the client shape.
    ///
    /// Missing, null, or mistyped scalars become `""`, lists become empty, and
    /// avatar/stats/settings fields come from `defaults` one by one.
    #[must_use]
    pub fn from_server(user: &ServerUser, defaults: &UserDefaults) -> Self {
        let fields = user.fields();
        let stats = fields
            .object(&["learning_stats", "learningStats"])
            .unwrap_or(Fields(None));
        let settings = fields.object(&["settings"]).unwrap_or(Fields(None));

        Self {
            id: fields.text(&["id"]).unwrap_or_default(),
            name: fields.text(&["name"]).unwrap_or_default(),
            email: fields.text(&["email"]).unwrap_or_default(),
            phone: fields.text(&["phone"]).unwrap_or_default(),
            location: fields.text(&["location"]).unwrap_or_default(),
            farm_size: fields.text(&["farm_size", "farmSize"]).unwrap_or_default(),
            primary_crops: fields
                .list(&["primary_crops", "primaryCrops"])
                .unwrap_or_default(),
            farming_experience: fields
                .text(&["farming_experience", "farmingExperience"])
                .unwrap_or_default(),
            water_source: fields
                .text(&["water_source", "waterSource"])
                .unwrap_or_default(),
            avatar: resolve_avatar(user.record.get("avatar"))
                .unwrap_or_else(|| defaults.avatar.clone()),
            learning_stats: LearningStats::read(stats, &defaults.learning_stats),
            settings: UserSettings::read(settings, &defaults.settings),
        }
    }

    /// The placeholder user shown when nobody is signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: String::new(),
            name: "Farmer".to_owned(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            farm_size: String::new(),
            primary_crops: Vec::new(),
            farming_experience: String::new(),
            water_source: "borewell".to_owned(),
            avatar: Avatar::default_choice(),
            learning_stats: LearningStats::default(),
            settings: UserSettings::default(),
        }
    }
}

// The server stores avatars as free-form objects; a bare string is treated as a catalog id.
fn resolve_avatar(raw: Option<&Value>) -> Option<Avatar> {
    match raw? {
        Value::String(id) => Avatar::find(id),
        value @ Value::Object(_) => serde_json::from_value::<Avatar>(value.clone())
            .ok()
            .filter(|avatar| !avatar.id.is_empty()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ServerUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_fields_fall_back_to_empty_values() {
        let user = User::from_server(
            &parse(json!({ "id": "1", "name": "A" })),
            &UserDefaults::default(),
        );

        assert_eq!(user.id, "1");
        assert_eq!(user.name, "A");
        assert_eq!(user.phone, "");
        assert_eq!(user.email, "");
        assert_eq!(user.farm_size, "");
        assert!(user.primary_crops.is_empty());
        assert_eq!(user.avatar, Avatar::default_choice());
        assert_eq!(user.learning_stats, LearningStats::default());
        assert_eq!(user.settings, UserSettings::default());
    }

    #[test]
    fn null_fields_are_treated_as_missing() {
        let user = User::from_server(
            &parse(json!({ "id": null, "phone": null, "primary_crops": null })),
            &UserDefaults::default(),
        );

        assert_eq!(user.id, "");
        assert_eq!(user.phone, "");
        assert!(user.primary_crops.is_empty());
    }

    #[test]
    fn empty_record_maps_to_defaults() {
        let user = User::from_server(&ServerUser::default(), &UserDefaults::default());
        assert_eq!(user.id, "");
        assert_eq!(user.water_source, "");
        assert_eq!(user.avatar.id, "cow");
    }

    #[test]
    fn snake_case_fields_are_mapped() {
        let user = User::from_server(
            &parse(json!({
                "id": "7",
                "farm_size": "5 acres",
                "primary_crops": ["rice", "wheat"],
                "farming_experience": "10 years",
                "water_source": "canal",
                "learning_stats": { "knowledge_points": 150, "current_level": 3 }
            })),
            &UserDefaults::default(),
        );

        assert_eq!(user.farm_size, "5 acres");
        assert_eq!(user.primary_crops, vec!["rice", "wheat"]);
        assert_eq!(user.farming_experience, "10 years");
        assert_eq!(user.water_source, "canal");
        assert_eq!(user.learning_stats.knowledge_points, 150);
        assert_eq!(user.learning_stats.current_level, 3);
        assert_eq!(user.learning_stats.next_level_points, 100);
    }

    #[test]
    fn camel_case_fields_are_used_when_snake_case_is_empty() {
        let user = User::from_server(
            &parse(json!({ "farm_size": "", "farmSize": "2 acres", "primaryCrops": ["millet"] })),
            &UserDefaults::default(),
        );

        assert_eq!(user.farm_size, "2 acres");
        assert_eq!(user.primary_crops, vec!["millet"]);
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let user = User::from_server(&parse(json!({ "id": 42 })), &UserDefaults::default());
        assert_eq!(user.id, "42");
    }

    #[test]
    fn avatar_resolves_from_object_or_catalog_id() {
        let defaults = UserDefaults::default();

        let from_object = User::from_server(
            &parse(json!({ "avatar": { "id": "goat", "name": "Bakri", "type": "Livestock Guardian", "emoji": "🐐" } })),
            &defaults,
        );
        assert_eq!(from_object.avatar.id, "goat");

        let from_id = User::from_server(&parse(json!({ "avatar": "rabbit" })), &defaults);
        assert_eq!(from_id.avatar.name, "Khargosh");

        let empty = User::from_server(&parse(json!({ "avatar": {} })), &defaults);
        assert_eq!(empty.avatar, defaults.avatar);
    }

    #[test]
    fn null_stat_counters_keep_their_defaults() {
        let user = User::from_server(
            &parse(json!({ "learning_stats": { "knowledge_points": null, "learning_streak": 4 } })),
            &UserDefaults::default(),
        );

        assert_eq!(user.learning_stats.knowledge_points, 0);
        assert_eq!(user.learning_stats.learning_streak, 4);
        assert_eq!(user.learning_stats.current_level, 1);
    }

    #[test]
    fn fractional_stat_counters_are_rounded() {
        let user = User::from_server(
            &parse(json!({ "learning_stats": { "knowledge_points": 12.5, "current_level": -2 } })),
            &UserDefaults::default(),
        );

        assert_eq!(user.learning_stats.knowledge_points, 13);
        assert_eq!(user.learning_stats.current_level, 1);
    }

    #[test]
    fn numeric_farm_size_becomes_text() {
        let user = User::from_server(&parse(json!({ "farm_size": 5 })), &UserDefaults::default());
        assert_eq!(user.farm_size, "5");

        let user = User::from_server(
            &parse(json!({ "farm_size": true, "farmSize": "3 acres" })),
            &UserDefaults::default(),
        );
        assert_eq!(user.farm_size, "3 acres");
    }

    #[test]
    fn non_string_crops_are_skipped() {
        let user = User::from_server(
            &parse(json!({ "primary_crops": ["rice", null, 7, "wheat"] })),
            &UserDefaults::default(),
        );
        assert_eq!(user.primary_crops, vec!["rice", "wheat"]);

        let user = User::from_server(
            &parse(json!({ "primary_crops": "rice" })),
            &UserDefaults::default(),
        );
        assert!(user.primary_crops.is_empty());
    }

    #[test]
    fn null_settings_sections_use_defaults() {
        let user = User::from_server(
            &parse(json!({
                "settings": {
                    "notifications": null,
                    "privacy": { "location_sharing": true, "progress_sharing": "yes" },
                    "preferences": { "language": "hi" }
                }
            })),
            &UserDefaults::default(),
        );

        assert_eq!(user.settings.notifications, NotificationSettings::default());
        assert!(user.settings.privacy.location_sharing);
        assert!(user.settings.privacy.progress_sharing);
        assert_eq!(user.settings.preferences.language, "hi");
        assert_eq!(user.settings.preferences.theme, "auto");
    }

    #[test]
    fn non_object_record_maps_to_empty_user() {
        let user = User::from_server(&parse(json!("not a user")), &UserDefaults::default());
        assert_eq!(user.id, "");
        assert_eq!(user.avatar, Avatar::default_choice());
    }

    #[test]
    fn mapped_user_serializes_in_camel_case() {
        let user = User::anonymous();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("farmSize").is_some());
        assert!(value.get("primaryCrops").is_some());
        assert_eq!(value["learningStats"]["currentLevel"], 1);
    }
}
