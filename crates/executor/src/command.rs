//! Commands: text plus parameters, executed against a connection.
//!
//! A [`Command`] carries:
//! - **Text**: an `INSERT`, `UPDATE` or `DELETE` statement, or a SELECT
//! - **Parameters**: ordered named bind values
//! - **Collection**: the physical collection addressed
//! - **Record type**: optional; enables type discrimination and readers
//! - **Identifier field**: optional business field that maps to `id`
//!
//! # Example
//!
//! ```ignore
//! use cosmosql::{Command, Connection, ConnectionConfig, RecordType};
//!
//! let mut insert = connection.create_command()
//!     .with_collection("Users")
//!     .with_record_type(RecordType::named("User"))
//!     .with_id_field("Email")
//!     .with_text("INSERT Users (Users.Name, Users.Email) VALUES (@Name, @Email)");
//! insert.add_parameter("Users.Name", "Ann");
//! insert.add_parameter("Users.Email", "a@b.com");
//! let affected = insert.execute_non_query()?;
//! ```

use serde_json::Value;
use tracing::debug;

use cosmosql_core::{ParamValue, ParameterSet};

use crate::cancel::CancelToken;
use crate::connection::{Connection, DbConnection};
use crate::context::ExecutionContext;
use crate::discriminator::{RecordType, TypeDiscriminator};
use crate::executor::CommandExecutor;
use crate::reader::DataReader;
use crate::statement::StatementKind;
use crate::types::Affected;
use crate::{Error, Result};

/// A command against a document collection.
#[derive(Debug, Clone, Default)]
pub struct Command {
    connection: Option<Connection>,
    text: String,
    parameters: ParameterSet,
    collection: Option<String>,
    record_type: Option<RecordType>,
    id_field: Option<String>,
    cancel: CancelToken,
}

impl Command {
    /// Create a command bound to a connection.
    pub fn new(connection: &Connection) -> Self {
        Self {
            connection: Some(connection.clone()),
            ..Self::default()
        }
    }

    /// Create a command with no connection.
    pub fn detached() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Attach to a connection.
    ///
    /// # Errors
    ///
    /// `Configuration` when the connection is not a document [`Connection`].
    pub fn set_connection(&mut self, connection: &dyn DbConnection) -> Result<()> {
        let connection = connection
            .as_any()
            .downcast_ref::<Connection>()
            .ok_or_else(|| {
                Error::configuration("the connection passed is not a document connection")
            })?;
        self.connection = Some(connection.clone());
        Ok(())
    }

    /// The attached connection.
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Command text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the command text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Builder-style [`Command::set_text`].
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Kind of the current text.
    pub fn statement_kind(&self) -> StatementKind {
        StatementKind::classify(&self.text)
    }

    /// Bound parameters.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Bound parameters, mutable.
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    /// Bind a parameter.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> &mut Self {
        self.parameters.add(name, value);
        self
    }

    /// Builder-style [`Command::add_parameter`].
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.add(name, value);
        self
    }

    /// Collection addressed.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Set the collection.
    pub fn set_collection(&mut self, collection: impl Into<String>) {
        self.collection = Some(collection.into());
    }

    /// Builder-style [`Command::set_collection`].
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.set_collection(collection);
        self
    }

    /// Declared record type.
    pub fn record_type(&self) -> Option<&RecordType> {
        self.record_type.as_ref()
    }

    /// Declare the record type.
    pub fn set_record_type(&mut self, record_type: RecordType) {
        self.record_type = Some(record_type);
    }

    /// Builder-style [`Command::set_record_type`].
    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.set_record_type(record_type);
        self
    }

    /// Declare the record type from a Rust type.
    pub fn with_record<T: ?Sized>(self) -> Self {
        self.with_record_type(RecordType::of::<T>())
    }

    /// Identifier field.
    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    /// Set the identifier field.
    pub fn set_id_field(&mut self, field: impl Into<String>) {
        self.id_field = Some(field.into());
    }

    /// Builder-style [`Command::set_id_field`].
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.set_id_field(field);
        self
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Cancel the command. Takes effect at the next store call or feed page.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle that cancels this command from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run an `INSERT`, `UPDATE` or `DELETE`; any other text runs as a
    /// scalar query whose integer result is the affected count.
    pub fn execute_non_query(&self) -> Result<Affected> {
        self.executor()?.non_query()
    }

    /// First value of the query result.
    pub fn execute_scalar(&self) -> Result<Option<Value>> {
        self.executor()?.scalar()
    }

    /// Forward-only reader over the query result. Requires a record type.
    pub fn execute_reader(&self) -> Result<DataReader> {
        self.executor()?.reader()
    }

    fn executor(&self) -> Result<CommandExecutor<'_>> {
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| Error::configuration("command has no connection"))?;
        let collection = self
            .collection
            .as_deref()
            .ok_or_else(|| Error::configuration("command has no collection"))?;
        if self.text.trim().is_empty() {
            return Err(Error::invalid_input("command text is empty"));
        }

        let discriminator = TypeDiscriminator::new(self.record_type.as_ref(), collection);
        debug!(
            target: "cosmosql::command",
            collection,
            discriminated = discriminator.is_active(),
            parameters = self.parameters.len(),
            "command prepared"
        );
        let ctx = ExecutionContext::new(
            connection.store(),
            connection.collection(collection),
            connection.config(),
            discriminator,
            &self.cancel,
        );
        Ok(CommandExecutor::new(
            ctx,
            &self.text,
            &self.parameters,
            self.record_type.as_ref(),
            self.id_field.as_deref(),
        ))
    }
}
