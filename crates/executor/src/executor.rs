//! The CommandExecutor - runs one command against the store.
//!
//! Mutations go through the document builder (plus sequence allocation or
//! surrogate lookup) and end in a single write. Everything else is parsed
//! as a SELECT, narrowed by the type discriminator and, when `@Page` is
//! bound, read through the paging translator.

use cosmosql_core::{
    bind_name, document_id, FeedOptions, ParameterSet, QueryParameter, SelectQuery, ID_KEY,
};
use serde_json::Value;
use tracing::debug;

use crate::builder::DocumentBuilder;
use crate::context::ExecutionContext;
use crate::discriminator::RecordType;
use crate::paging::{is_paging_parameter, PageWindow, PagingTranslator};
use crate::reader::DataReader;
use crate::sequence::SequenceAllocator;
use crate::statement::{insert_target, StatementKind};
use crate::surrogate::resolve_id;
use crate::types::Affected;
use crate::{Error, Result};

/// Literal that routes a scalar through the single-page count path.
const COUNT_MARKER: &str = "COUNT";

/// Executes one command.
pub struct CommandExecutor<'a> {
    ctx: ExecutionContext<'a>,
    text: &'a str,
    parameters: &'a ParameterSet,
    record_type: Option<&'a RecordType>,
    id_field: Option<&'a str>,
}

impl<'a> CommandExecutor<'a> {
    /// Create an executor.
    pub fn new(
        ctx: ExecutionContext<'a>,
        text: &'a str,
        parameters: &'a ParameterSet,
        record_type: Option<&'a RecordType>,
        id_field: Option<&'a str>,
    ) -> Self {
        Self {
            ctx,
            text,
            parameters,
            record_type,
            id_field,
        }
    }

    /// Statement kind of the command text.
    pub fn kind(&self) -> StatementKind {
        StatementKind::classify(self.text)
    }

    /// Run a mutation, or a query whose scalar result is read as a count.
    pub fn non_query(&self) -> Result<Affected> {
        let kind = self.kind();
        debug!(
            target: "cosmosql::command",
            %kind,
            collection = %self.ctx.collection(),
            "execute non-query"
        );
        match kind {
            StatementKind::Insert => self.insert(),
            StatementKind::Update => self.update(),
            StatementKind::Delete => self.delete(),
            StatementKind::Select => {
                let rows = self
                    .scalar()?
                    .as_ref()
                    .and_then(Value::as_i64)
                    .and_then(|n| u64::try_from(n).ok())
                    .unwrap_or(0);
                Ok(Affected::count(rows))
            }
        }
    }

    /// First value of the result.
    ///
    /// Text containing `COUNT` reads one page of size 1 and returns its
    /// first value as an integer, 0 when the page is empty. Other queries
    /// return the first field of the first row.
    pub fn scalar(&self) -> Result<Option<Value>> {
        self.require_query("execute_scalar")?;
        if self.text.contains(COUNT_MARKER) {
            let query = SelectQuery::parse(self.text)?;
            let spec = self.ctx.prepare(query, &self.forwarded_parameters());
            let page = self
                .ctx
                .first_page(spec, FeedOptions::with_max_item_count(1))?;
            let count = page.first().and_then(Value::as_i64).unwrap_or(0);
            return Ok(Some(Value::from(count)));
        }

        let first = self.rows()?.into_iter().next();
        Ok(first.and_then(|row| match row {
            Value::Object(map) => map.into_iter().next().map(|(_, v)| v),
            scalar => Some(scalar),
        }))
    }

    /// Rows of the query as a forward-only reader.
    pub fn reader(&self) -> Result<DataReader> {
        self.require_query("execute_reader")?;
        let record_type = self
            .record_type
            .cloned()
            .ok_or_else(|| Error::configuration("execute_reader requires a record type"))?;
        Ok(DataReader::new(self.rows()?, record_type))
    }

    /// Full query path: plain drain, or the two-pass paged read.
    pub fn rows(&self) -> Result<Vec<Value>> {
        let query = SelectQuery::parse(self.text)?;
        let parameters = self.forwarded_parameters();
        match PageWindow::from_parameters(self.parameters)? {
            Some(window) => PagingTranslator::new(&self.ctx).fetch(&query, &parameters, window),
            None => {
                let spec = self.ctx.prepare(query, &parameters);
                self.ctx.drain(spec, self.ctx.default_feed_options(), None)
            }
        }
    }

    fn insert(&self) -> Result<Affected> {
        let builder = DocumentBuilder::new(self.ctx.discriminator(), self.id_field);
        let mut built = builder.build(
            StatementKind::Insert,
            insert_target(self.text),
            self.parameters,
        );

        let mut generated_id = None;
        if built.pending_sequence.is_some() {
            let logical_type = self
                .record_type
                .map(RecordType::document_type)
                .unwrap_or(&self.ctx.collection().collection);
            let value = SequenceAllocator::new(&self.ctx).allocate(logical_type)?;
            built.apply_sequence(value);
            generated_id = Some(value);
        }

        let disable_id_generation = built.has_id();
        let response = self.ctx.create(built.document, disable_id_generation)?;
        Ok(Affected::from_status(response.status, generated_id))
    }

    fn update(&self) -> Result<Affected> {
        let builder = DocumentBuilder::new(self.ctx.discriminator(), self.id_field);
        let mut built = builder.build(StatementKind::Update, None, self.parameters);

        if !built.has_id() {
            let field = self.id_field.unwrap_or(ID_KEY);
            let missing = || Error::MissingIdentifier {
                field: field.to_string(),
            };
            let bound = self.parameters.get(field).ok_or_else(missing)?;
            let id = resolve_id(&self.ctx, field, bound.value())?.ok_or_else(missing)?;
            built
                .document
                .insert(ID_KEY.to_string(), Value::String(id));
        }

        let response = self.ctx.upsert(built.document, true)?;
        Ok(Affected::from_status(response.status, None))
    }

    fn delete(&self) -> Result<Affected> {
        let builder = DocumentBuilder::new(self.ctx.discriminator(), self.id_field);
        let built = builder.build(StatementKind::Delete, None, self.parameters);

        let id = match document_id(&built.document) {
            Some(id) => id,
            None => {
                let Some(field) = self.id_field else {
                    return Ok(Affected::none());
                };
                let Some(bound) = self.parameters.get(field) else {
                    return Ok(Affected::none());
                };
                match resolve_id(&self.ctx, field, bound.value())? {
                    Some(id) => id,
                    None => return Ok(Affected::none()),
                }
            }
        };

        let response = self.ctx.delete(&id)?;
        Ok(Affected::from_status(response.status, None))
    }

    fn require_query(&self, entry: &str) -> Result<()> {
        let kind = self.kind();
        if kind.is_mutation() {
            return Err(Error::UnsupportedStatement {
                reason: format!("{} cannot run {} statements", entry, kind),
            });
        }
        Ok(())
    }

    /// Bound parameters as sent to the store, without paging controls.
    fn forwarded_parameters(&self) -> Vec<QueryParameter> {
        self.parameters
            .iter()
            .filter(|p| !is_paging_parameter(p.name()))
            .map(|p| QueryParameter {
                name: bind_name(p.name()),
                value: p.value().to_json(),
            })
            .collect()
    }
}
