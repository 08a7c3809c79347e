use std::sync::Arc;

use super::{is_valid_sui_address, names, short_address};
use crate::constants::PARAM_USER_ID;
use crate::db::WalletStore;
use crate::error::{AppError, Result};
use crate::services::agent::registry::{ActionArgs, ActionOutput, ActionSpec, ParamKind, WalletAction};

fn caller(args: &ActionArgs) -> Result<&str> {
    args.get_str(PARAM_USER_ID)
        .ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))
}

pub struct ListContacts {
    spec: ActionSpec,
    store: Arc<dyn WalletStore>,
}

impl ListContacts {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::LIST_CONTACTS,
                "List saved contacts. Use for 'contacts', 'show contacts', 'address book'.",
            )
            .with_caller(),
            store,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for ListContacts {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let contacts = self.store.get_contacts(caller(args)?).await?;
        if contacts.is_empty() {
            return Ok(ActionOutput::Text(
                "📭 No contacts saved yet.\n\nAdd one: /contacts add alice 0x...".to_string(),
            ));
        }

        let mut text = String::from("👥 Your Contacts:\n");
        for contact in &contacts {
            text.push_str(&format!(
                "\n• {}: {}",
                contact.alias,
                short_address(&contact.address)
            ));
        }
        Ok(ActionOutput::Text(text))
    }
}

pub struct AddContact {
    spec: ActionSpec,
    store: Arc<dyn WalletStore>,
}

impl AddContact {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::ADD_CONTACT,
                "Save a contact name with a Sui address. Use for 'add contact', 'save address'.",
            )
            .with_caller()
            .required("name", ParamKind::String, "Friendly name, e.g. alice, mom, work")
            .required("address", ParamKind::String, "Sui address starting with 0x"),
            store,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for AddContact {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let user_id = caller(args)?;
        let Some(name) = args.get_str("name") else {
            return Ok(ActionOutput::error("Contact name is required."));
        };
        let address = args.get_str("address").unwrap_or_default();
        if !is_valid_sui_address(address) {
            return Ok(ActionOutput::Text(
                "❌ Invalid address. Must start with 0x followed by 40-64 hex characters."
                    .to_string(),
            ));
        }

        self.store.add_contact(user_id, name, address).await?;
        tracing::info!("Saved contact {} for user {}", name, user_id);
        Ok(ActionOutput::Text(format!(
            "✅ Added contact \"{}\" → {}",
            name,
            short_address(address)
        )))
    }
}

pub struct DeleteContact {
    spec: ActionSpec,
    store: Arc<dyn WalletStore>,
}

impl DeleteContact {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::DELETE_CONTACT,
                "Remove a contact. Use for 'remove contact', 'delete contact'.",
            )
            .with_caller()
            .required("name", ParamKind::String, "Name of the contact to remove"),
            store,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for DeleteContact {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let user_id = caller(args)?;
        let Some(name) = args.get_str("name") else {
            return Ok(ActionOutput::error("Contact name is required."));
        };
        if self.store.remove_contact(user_id, name).await? {
            Ok(ActionOutput::Text(format!("✅ Removed contact \"{}\"", name)))
        } else {
            Ok(ActionOutput::Text(format!("❌ Contact \"{}\" not found.", name)))
        }
    }
}
