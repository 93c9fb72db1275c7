//! Accounts: an account-level scope plus its mailbox scopes.

use std::any::Any;
use std::fmt;

use crate::error::Result;
use crate::inherit::qualify;
use crate::set::ConfigSet;
use crate::subset::{ConfigSubset, ScopeLevel};

/// Releases driver data when the account is freed.
pub type AccountDataFree = Box<dyn FnOnce(Box<dyn Any>)>;

/// A named account with its own overrides.
///
/// Mailbox scopes nest under the account, so an unset mailbox variable reads
/// the account's value, which in turn falls back to the global one.
pub struct Account {
    scope: ConfigSubset,
    mailboxes: Vec<ConfigSubset>,
    adata: Option<Box<dyn Any>>,
    adata_free: Option<AccountDataFree>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("scope", &self.scope)
            .field("mailboxes", &self.mailboxes)
            .field("adata", &self.adata.is_some())
            .finish_non_exhaustive()
    }
}

impl Account {
    /// Creates an account scope shadowing `var_names`.
    ///
    /// # Errors
    ///
    /// As [`ConfigSubset::create`].
    pub fn new(cs: &mut ConfigSet, name: &str, var_names: &[&str]) -> Result<Self> {
        let scope = ConfigSubset::create(cs, name, None, ScopeLevel::Account, var_names)?;
        Ok(Self {
            scope,
            mailboxes: Vec::new(),
            adata: None,
            adata_free: None,
        })
    }

    /// The account's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.scope.name()
    }

    /// The account-level scope.
    #[must_use]
    pub const fn scope(&self) -> &ConfigSubset {
        &self.scope
    }

    /// Adds a mailbox scope named `account:mailbox`.
    ///
    /// Each variable must also be shadowed by the account.
    ///
    /// # Errors
    ///
    /// As [`ConfigSubset::create`]; nothing is added on failure.
    pub fn add_mailbox(
        &mut self,
        cs: &mut ConfigSet,
        mailbox: &str,
        var_names: &[&str],
    ) -> Result<&ConfigSubset> {
        let name = qualify(self.name(), mailbox);
        let scope = ConfigSubset::create(
            cs,
            &name,
            Some(self.scope.name()),
            ScopeLevel::Mailbox,
            var_names,
        )?;
        self.mailboxes.push(scope);
        Ok(&self.mailboxes[self.mailboxes.len() - 1])
    }

    /// Finds a mailbox scope by its short name.
    #[must_use]
    pub fn mailbox(&self, mailbox: &str) -> Option<&ConfigSubset> {
        let name = qualify(self.name(), mailbox);
        self.mailboxes.iter().find(|m| m.name() == name)
    }

    /// All mailbox scopes, in creation order.
    #[must_use]
    pub fn mailboxes(&self) -> &[ConfigSubset] {
        &self.mailboxes
    }

    /// Destroys one mailbox scope. Returns false if there was none.
    ///
    /// # Errors
    ///
    /// As [`ConfigSubset::destroy`].
    pub fn remove_mailbox(&mut self, cs: &mut ConfigSet, mailbox: &str) -> Result<bool> {
        let name = qualify(self.name(), mailbox);
        let Some(pos) = self.mailboxes.iter().position(|m| m.name() == name) else {
            return Ok(false);
        };
        self.mailboxes.remove(pos).destroy(cs)?;
        Ok(true)
    }

    /// Attaches driver data and the function that releases it.
    ///
    /// Any previous data is released first.
    pub fn set_adata(&mut self, data: Box<dyn Any>, free: Option<AccountDataFree>) {
        self.release_adata();
        self.adata = Some(data);
        self.adata_free = free;
    }

    /// The driver data, if it is a `T`.
    #[must_use]
    pub fn adata<T: Any>(&self) -> Option<&T> {
        self.adata.as_ref()?.downcast_ref()
    }

    /// The driver data, mutably, if it is a `T`.
    pub fn adata_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.adata.as_mut()?.downcast_mut()
    }

    /// Destroys the mailbox scopes, then the account scope, then the driver
    /// data.
    ///
    /// # Errors
    ///
    /// The first scope error hit; everything is still released.
    pub fn free(mut self, cs: &mut ConfigSet) -> Result<()> {
        let mut first_error = None;
        while let Some(mailbox) = self.mailboxes.pop() {
            if let Err(e) = mailbox.destroy(cs) {
                first_error.get_or_insert(e);
            }
        }
        self.release_adata();
        let Self { scope, .. } = self;
        if let Err(e) = scope.destroy(cs) {
            first_error.get_or_insert(e);
        }
        first_error.map_or(Ok(()), Err)
    }

    fn release_adata(&mut self) {
        if let Some(data) = self.adata.take() {
            if let Some(free) = self.adata_free.take() {
                free(data);
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::def::VariableDef;
    use crate::error::ErrorKind;

    fn orchard() -> ConfigSet {
        let mut cs = ConfigSet::with_builtin_types("test").unwrap();
        cs.register_variables([
            VariableDef::number("Quince", 5),
            VariableDef::string("Raspberry", None),
        ])
        .unwrap();
        cs
    }

    #[test]
    fn test_mailbox_inherits_through_account() {
        let mut cs = orchard();
        let mut account = Account::new(&mut cs, "ac", &["Quince"]).unwrap();
        let mailbox = account.add_mailbox(&mut cs, "mbox", &["Quince"]).unwrap();
        assert_eq!(mailbox.name(), "ac:mbox");
        assert_eq!(mailbox.parent(), Some("ac"));
        assert_eq!(mailbox.level(), ScopeLevel::Mailbox);

        assert_eq!(cs.get_string("ac:mbox:Quince").unwrap().as_deref(), Some("5"));
        cs.set_string("ac:Quince", "7").unwrap();
        assert_eq!(cs.get_string("ac:mbox:Quince").unwrap().as_deref(), Some("7"));

        account.free(&mut cs).unwrap();
        assert!(cs.lookup("ac:Quince").is_none());
        assert!(cs.lookup("ac:mbox:Quince").is_none());
    }

    #[test]
    fn test_mailbox_needs_account_variable() {
        let mut cs = orchard();
        let mut account = Account::new(&mut cs, "ac", &["Quince"]).unwrap();
        let err = account
            .add_mailbox(&mut cs, "mbox", &["Quince", "Raspberry"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownVariable);
        assert!(account.mailboxes().is_empty());
        assert!(cs.lookup("ac:mbox:Quince").is_none());
        account.free(&mut cs).unwrap();
    }

    #[test]
    fn test_remove_mailbox() {
        let mut cs = orchard();
        let mut account = Account::new(&mut cs, "ac", &["Quince"]).unwrap();
        account.add_mailbox(&mut cs, "inbox", &["Quince"]).unwrap();
        assert!(account.mailbox("inbox").is_some());
        assert!(account.remove_mailbox(&mut cs, "inbox").unwrap());
        assert!(!account.remove_mailbox(&mut cs, "inbox").unwrap());
        assert!(cs.lookup("ac:inbox:Quince").is_none());
        account.free(&mut cs).unwrap();
    }

    #[test]
    fn test_adata_released_on_free() {
        let mut cs = orchard();
        let freed = Rc::new(Cell::new(0));
        let mut account = Account::new(&mut cs, "ac", &[]).unwrap();

        let counter = Rc::clone(&freed);
        account.set_adata(
            Box::new(42_u32),
            Some(Box::new(move |data: Box<dyn Any>| {
                assert_eq!(data.downcast_ref::<u32>(), Some(&42));
                counter.set(counter.get() + 1);
            })),
        );
        assert_eq!(account.adata::<u32>(), Some(&42));
        assert!(account.adata::<String>().is_none());
        *account.adata_mut::<u32>().unwrap() = 42;

        account.free(&mut cs).unwrap();
        assert_eq!(freed.get(), 1);
    }
}
