//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::{Airtable, Table};
use crate::config::{base_id_from_env, Configuration};
use crate::error::{Error, Result};
use crate::mapping::RecordItem;
use crate::query::{Query, Sort, SortDirection};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and print its output
    pub async fn run(&self) -> Result<()> {
        for value in self.execute().await? {
            self.output_message(&value);
        }
        Ok(())
    }

    /// Run the CLI command and return the values it would print
    pub async fn execute(&self) -> Result<Vec<JsonValue>> {
        match &self.cli.command {
            Commands::Select {
                table,
                view,
                formula,
                max_records,
                page_size,
                fields,
                sort,
            } => {
                let query = build_query(
                    view.as_deref(),
                    formula.as_deref(),
                    *max_records,
                    *page_size,
                    fields,
                    sort,
                );
                debug!("Selecting from [{table}] with {query:?}");
                let items = self.table(table)?.select(&query).await?;
                items.iter().map(to_json).collect()
            }
            Commands::Find { table, id } => {
                let item = self.table(table)?.find(id).await?;
                Ok(vec![to_json(&item)?])
            }
            Commands::Create { table, fields_json } => {
                let item = RecordItem::with_fields(parse_fields(fields_json)?);
                let created = self.table(table)?.create(&item).await?;
                Ok(vec![to_json(&created)?])
            }
            Commands::Update {
                table,
                id,
                fields_json,
            } => {
                let item = RecordItem {
                    id: Some(id.clone()),
                    ..RecordItem::with_fields(parse_fields(fields_json)?)
                };
                let updated = self.table(table)?.update(&item).await?;
                Ok(vec![to_json(&updated)?])
            }
            Commands::Destroy { table, id } => {
                let deleted = self.table(table)?.destroy(id).await?;
                Ok(vec![json!({"id": id, "deleted": deleted})])
            }
        }
    }

    /// Resolve configuration from flags, falling back to the environment
    fn configuration(&self) -> Result<Configuration> {
        let mut config = match &self.cli.api_key {
            Some(key) => Configuration::new(key.clone()),
            None => Configuration::from_env()?,
        };
        if let Some(endpoint) = &self.cli.endpoint {
            config.endpoint_url.clone_from(endpoint);
        }
        if self.cli.timeout_ms.is_some() {
            config.timeout_ms = self.cli.timeout_ms;
        }
        config.validate()?;
        Ok(config)
    }

    fn base_id(&self) -> Result<String> {
        match &self.cli.base {
            Some(base) => Ok(base.clone()),
            None => base_id_from_env(),
        }
    }

    fn table(&self, name: &str) -> Result<Table<RecordItem>> {
        let airtable = Airtable::new(self.configuration()?)?;
        airtable.base(&self.base_id()?)?.records(name)
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

fn to_json(item: &RecordItem) -> Result<JsonValue> {
    Ok(serde_json::to_value(item)?)
}

fn parse_fields(raw: &str) -> Result<JsonObject> {
    match serde_json::from_str(raw)? {
        JsonValue::Object(fields) => Ok(fields),
        other => Err(Error::validation(format!(
            "--fields-json must be a JSON object, got {other}"
        ))),
    }
}

/// Parse `field` or `field:asc|desc`
///
/// A suffix that is not a direction stays part of the field name.
fn parse_sort(raw: &str) -> Sort {
    raw.rsplit_once(':')
        .and_then(|(field, direction)| {
            direction
                .parse::<SortDirection>()
                .ok()
                .map(|d| Sort::new(field, d))
        })
        .unwrap_or_else(|| Sort::asc(raw))
}

fn build_query(
    view: Option<&str>,
    formula: Option<&str>,
    max_records: Option<u32>,
    page_size: Option<u32>,
    fields: &[String],
    sort: &[String],
) -> Query {
    Query {
        fields: fields.to_vec(),
        max_records,
        view: view.map(String::from),
        filter_by_formula: formula.map(String::from),
        sort: sort.iter().map(|s| parse_sort(s)).collect(),
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cli(server: &MockServer, args: &[&str]) -> Cli {
        let endpoint = format!("{}/v0", server.uri());
        let mut argv = vec![
            "airtable-client",
            "--api-key",
            "keyTEST",
            "--base",
            "appBase",
            "--endpoint",
            endpoint.as_str(),
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test_case("Name", "Name", SortDirection::Asc ; "bare field")]
    #[test_case("Name:desc", "Name", SortDirection::Desc ; "explicit desc")]
    #[test_case("Name:ASC", "Name", SortDirection::Asc ; "case insensitive")]
    #[test_case("Time: start", "Time: start", SortDirection::Asc ; "colon in field name")]
    fn test_parse_sort(raw: &str, field: &str, direction: SortDirection) {
        assert_eq!(parse_sort(raw), Sort::new(field, direction));
    }

    #[test]
    fn test_parse_fields_requires_object() {
        assert!(parse_fields(r#"{"Name": "x"}"#).is_ok());
        assert!(parse_fields("[1]").unwrap_err().is_validation());
        assert!(matches!(parse_fields("{").unwrap_err(), Error::JsonParse(_)));
    }

    #[test]
    fn test_cli_parses_select() {
        let cli = Cli::try_parse_from([
            "airtable-client",
            "select",
            "Movies",
            "--view",
            "Main View",
            "--field",
            "Name",
            "--field",
            "Year",
            "--sort",
            "Year:desc",
            "--format",
            "pretty",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Commands::Select {
                table,
                view,
                fields,
                sort,
                ..
            } => {
                assert_eq!(table, "Movies");
                assert_eq!(view.as_deref(), Some("Main View"));
                assert_eq!(fields, vec!["Name", "Year"]);
                assert_eq!(sort, vec!["Year:desc"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_select_command() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/appBase/Movies"))
            .and(query_param("sort[0][field]", "Year"))
            .and(query_param("sort[0][direction]", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"id": "rec1", "fields": {"Name": "Alien"}}]
            })))
            .mount(&server)
            .await;

        let runner = Runner::new(cli(&server, &["select", "Movies", "--sort", "Year:desc"]));
        let output = runner.execute().await.unwrap();
        assert_eq!(output, vec![json!({"id": "rec1", "fields": {"Name": "Alien"}})]);
    }

    #[tokio::test]
    async fn test_update_command() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v0/appBase/Movies/rec1"))
            .and(body_json(json!({"fields": {"Name": "Aliens"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "rec1", "fields": {"Name": "Aliens"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = Runner::new(cli(
            &server,
            &["update", "Movies", "rec1", "--fields-json", r#"{"Name": "Aliens"}"#],
        ));
        let output = runner.execute().await.unwrap();
        assert_eq!(output[0]["fields"]["Name"], "Aliens");
    }

    #[tokio::test]
    async fn test_destroy_command() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v0/appBase/Movies/rec1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "rec1", "deleted": true})),
            )
            .mount(&server)
            .await;

        let runner = Runner::new(cli(&server, &["destroy", "Movies", "rec1"]));
        let output = runner.execute().await.unwrap();
        assert_eq!(output, vec![json!({"id": "rec1", "deleted": true})]);
    }
}
