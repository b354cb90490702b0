pub mod activation_tokens;
pub mod customers;
pub mod password_reset_tokens;
pub mod sale_items;
pub mod sale_services;
pub mod security_answers;
pub mod security_questions;
pub mod sells;
pub mod services;
pub mod stocks;
pub mod suppliers;
pub mod users;

pub use activation_tokens::Entity as ActivationTokens;
pub use customers::Entity as Customers;
pub use password_reset_tokens::Entity as PasswordResetTokens;
pub use sale_items::Entity as SaleItems;
pub use sale_services::Entity as SaleServices;
pub use security_answers::Entity as SecurityAnswers;
pub use security_questions::Entity as SecurityQuestions;
pub use sells::Entity as Sells;
pub use services::Entity as Services;
pub use stocks::Entity as Stocks;
pub use suppliers::Entity as Suppliers;
pub use users::Entity as Users;
