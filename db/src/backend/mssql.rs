//! SQL Server adapter over `tiberius`.
//!
//! Connect and request are each bounded by a 30 second timeout. Encryption is
//! required only when the entry sets `encrypt`; the server certificate is trusted
//! unless `trustServerCertificate` is explicitly false.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, FromSql};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::time::timeout;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::{handle_runtime, run_statement, DbError, EngineAdapter, QueryEngine};
use crate::config::{DatabaseConfig, EngineKind};
use crate::types::{Row, Value};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerAdapter;

pub struct SqlServerHandle {
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
}

impl EngineAdapter for SqlServerAdapter {
    type Handle = SqlServerHandle;

    fn kind(&self) -> EngineKind {
        EngineKind::SqlServer
    }

    fn open(&self, config: &DatabaseConfig) -> Result<SqlServerHandle, DbError> {
        let kind = self.kind();
        let tds = client_config(config);
        let addr = tds.get_addr();
        let runtime = handle_runtime()?;

        let connected = runtime.block_on(async {
            let connect = async {
                let tcp = TcpStream::connect(&addr)
                    .await
                    .map_err(|e| DbError::connection(kind, e))?;
                tcp.set_nodelay(true)
                    .map_err(|e| DbError::connection(kind, e))?;
                Client::connect(tds, tcp.compat_write())
                    .await
                    .map_err(|e| DbError::connection(kind, e))
            };
            timeout(CONNECT_TIMEOUT, connect).await
        });

        let client = match connected {
            Ok(result) => result?,
            Err(_) => {
                return Err(DbError::connection(
                    kind,
                    format!("Failed to connect to {} in {}ms", addr, CONNECT_TIMEOUT.as_millis()),
                ));
            }
        };
        Ok(SqlServerHandle { runtime, client })
    }

    fn run(&self, handle: &mut SqlServerHandle, sql: &str) -> Result<Vec<Row>, DbError> {
        let SqlServerHandle { runtime, client } = handle;

        let fetched = runtime.block_on(async {
            let request = async {
                let stream = client.simple_query(sql).await?;
                stream.into_first_result().await
            };
            timeout(REQUEST_TIMEOUT, request).await
        });

        match fetched {
            Ok(Ok(rows)) => Ok(rows.into_iter().map(convert_row).collect()),
            Ok(Err(e)) => Err(DbError::execution(self.kind(), e)),
            Err(_) => Err(DbError::execution(
                self.kind(),
                format!("Timeout: Request failed to complete in {}ms", REQUEST_TIMEOUT.as_millis()),
            )),
        }
    }

    fn close(&self, handle: SqlServerHandle) -> Result<(), DbError> {
        let SqlServerHandle { runtime, client } = handle;
        runtime
            .block_on(client.close())
            .map_err(|e| DbError::close(self.kind(), e))
    }
}

impl QueryEngine for SqlServerAdapter {
    fn engine_kind(&self) -> EngineKind {
        self.kind()
    }

    fn query(&self, config: &DatabaseConfig, sql: &str) -> Result<Vec<Row>, DbError> {
        run_statement(self, config, sql)
    }
}

fn client_config(config: &DatabaseConfig) -> Config {
    let (host, port) = config.endpoint();
    let mut tds = Config::new();
    tds.host(host);
    if let Some(port) = port {
        tds.port(port);
    }
    if let Some(database) = config.database.as_deref().filter(|d| !d.is_empty()) {
        tds.database(database);
    }
    tds.authentication(AuthMethod::sql_server(config.username(), config.password()));
    tds.encryption(if config.encrypt() {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });
    if config.trust_server_certificate() {
        tds.trust_cert();
    }
    tds
}

fn convert_row(row: tiberius::Row) -> Row {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    names
        .into_iter()
        .zip(row)
        .map(|(name, data)| (name, convert_cell(&data)))
        .collect()
}

fn convert_cell(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map_or(Value::Null, |n| Value::Int(n.into())),
        ColumnData::I16(v) => v.map_or(Value::Null, |n| Value::Int(n.into())),
        ColumnData::I32(v) => v.map_or(Value::Null, |n| Value::Int(n.into())),
        ColumnData::I64(v) => v.map_or(Value::Null, Value::Int),
        ColumnData::F32(v) => v.map_or(Value::Null, |f| Value::Float(f.into())),
        ColumnData::F64(v) => v.map_or(Value::Null, Value::Float),
        ColumnData::Bit(v) => v.map_or(Value::Null, Value::Bool),
        ColumnData::String(v) => v.as_deref().map_or(Value::Null, Value::from),
        ColumnData::Guid(v) => v.map_or(Value::Null, |g| Value::Text(g.to_string())),
        ColumnData::Binary(v) => v
            .as_deref()
            .map_or(Value::Null, |b| Value::Bytes(b.to_vec())),
        ColumnData::Numeric(v) => v.map_or(Value::Null, |n| Value::Text(n.to_string())),
        ColumnData::Xml(v) => v
            .as_ref()
            .map_or(Value::Null, |x| Value::Text(x.to_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            temporal::<NaiveDateTime>(data)
        }
        ColumnData::Date(_) => temporal::<NaiveDate>(data),
        ColumnData::Time(_) => temporal::<NaiveTime>(data),
        ColumnData::DateTimeOffset(_) => temporal::<DateTime<FixedOffset>>(data),
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

fn temporal<'a, T>(data: &'a ColumnData<'static>) -> Value
where
    T: FromSql<'a> + ToString,
{
    match T::from_sql(data) {
        Ok(Some(v)) => Value::Text(v.to_string()),
        Ok(None) => Value::Null,
        Err(e) => {
            tracing::debug!(error = %e, "undecodable SQL Server temporal value");
            Value::Null
        }
    }
}
