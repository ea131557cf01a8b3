mod account;
mod course;
mod credentials;
mod quiz;
mod user;

pub use account::{Account, DataMode};
pub use course::{Course, QUIZ_PROGRESS_STEP};
pub use credentials::{
    Credentials, CredentialsError, LoginDraft, Registration, RegistrationDraft, DEFAULT_FARM_SIZE,
    DEFAULT_LOCATION, DEFAULT_PHONE, MIN_PASSWORD_LEN,
};
pub use quiz::{Question, Quiz};
pub use user::{
    Avatar, LearningStats, NotificationSettings, Preferences, PrivacySettings, ServerUser, User,
    UserDefaults, UserSettings,
};
