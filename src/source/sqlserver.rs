//! SQL Server source over TDS
//!
//! One connection per source, opened on the first query and closed when the
//! source is closed or dropped. No pooling, retries or timeouts.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, FromSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use super::descriptor::ConnectionDescriptor;
use super::error::{SourceError, SourceResult};
use super::record::{Column, ColumnType, Decimal, RecordSet, Value};
use super::Source;

/// Scale assumed for decimal columns with no non-null values
const DEFAULT_DECIMAL_SCALE: u8 = 4;

type TdsClient = Client<Compat<TcpStream>>;

/// Reads query results from a SQL Server database
pub struct SqlServerSource {
    descriptor: ConnectionDescriptor,
    client: Option<TdsClient>,
}

impl SqlServerSource {
    /// Create a source; no connection is made until the first query
    pub fn new(descriptor: ConnectionDescriptor) -> Self {
        Self {
            descriptor,
            client: None,
        }
    }

    fn tds_config(&self) -> SourceResult<Config> {
        let options = self.descriptor.options().ok_or(SourceError::Closed)?;

        let mut config = Config::new();
        config.host(self.descriptor.host());
        config.port(self.descriptor.port());
        config.database(self.descriptor.database());
        config.authentication(AuthMethod::sql_server(
            &options.user,
            options.password.expose(),
        ));
        config.encryption(if options.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::Off
        });
        if options.trust_server_certificate {
            config.trust_cert();
        }
        config.application_name(env!("CARGO_PKG_NAME"));
        Ok(config)
    }

    async fn open_tcp(address: String) -> SourceResult<TcpStream> {
        let tcp = TcpStream::connect(&address)
            .await
            .map_err(|e| SourceError::Connection {
                address: address.clone(),
                message: e.to_string(),
            })?;
        tcp.set_nodelay(true).map_err(|e| SourceError::Connection {
            address,
            message: e.to_string(),
        })?;
        Ok(tcp)
    }

    async fn connect(&self) -> SourceResult<TdsClient> {
        let config = self.tds_config()?;
        info!(address = %self.descriptor.address(), "Connecting to SQL Server");

        let tcp = Self::open_tcp(config.get_addr()).await?;
        match Client::connect(config.clone(), tcp.compat_write()).await {
            Ok(client) => Ok(client),
            // Azure SQL gateways redirect the login to the database node
            Err(tiberius::error::Error::Routing { host, port }) => {
                debug!(host = %host, port, "Following server routing redirect");
                let mut config = config;
                config.host(&host);
                config.port(port);
                let tcp = Self::open_tcp(config.get_addr()).await?;
                Ok(Client::connect(config, tcp.compat_write()).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn client(&mut self) -> SourceResult<&mut TdsClient> {
        if self.client.is_none() {
            let client = self.connect().await?;
            self.client = Some(client);
        }
        self.client.as_mut().ok_or(SourceError::Closed)
    }
}

#[async_trait]
impl Source for SqlServerSource {
    fn describe(&self) -> String {
        format!(
            "sqlserver://{}/{}",
            self.descriptor.address(),
            self.descriptor.database()
        )
    }

    async fn fetch(&mut self, query: &str) -> SourceResult<RecordSet> {
        let client = self.client().await?;

        let mut stream = client.simple_query(query).await?;
        let metadata: Vec<(String, tiberius::ColumnType)> = stream
            .columns()
            .await?
            .map(|columns| {
                columns
                    .iter()
                    .map(|c| (c.name().to_string(), c.column_type()))
                    .collect()
            })
            .unwrap_or_default();
        let rows = stream.into_first_result().await?;

        let mut values: Vec<Vec<Value>> = Vec::with_capacity(rows.len());
        for row in rows {
            let mut converted = Vec::with_capacity(metadata.len());
            for data in row.into_iter() {
                converted.push(convert_cell(&data)?);
            }
            values.push(converted);
        }

        let columns = metadata
            .iter()
            .enumerate()
            .map(|(index, (name, tds_type))| {
                Column::new(name.clone(), column_type(*tds_type, index, &values))
            })
            .collect();

        let mut records = RecordSet::new(columns);
        for row in values {
            records.push_row(row);
        }
        debug!(rows = records.len(), "Query returned");
        Ok(records)
    }

    async fn close(&mut self) -> SourceResult<()> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        self.descriptor.scrub();
        Ok(())
    }
}

/// Map a TDS column type onto the pipeline's column types. Decimal scale is
/// not part of the column metadata the client exposes, so it is taken from
/// the values.
fn column_type(tds_type: tiberius::ColumnType, index: usize, rows: &[Vec<Value>]) -> ColumnType {
    use tiberius::ColumnType as Tds;

    match tds_type {
        Tds::Bit | Tds::Bitn => ColumnType::Boolean,
        Tds::Int1 | Tds::Int2 | Tds::Int4 => ColumnType::Integer,
        Tds::Int8 | Tds::Intn => ColumnType::BigInt,
        Tds::Float4 | Tds::Float8 | Tds::Floatn => ColumnType::Double,
        Tds::Money | Tds::Money4 => ColumnType::Double,
        Tds::Decimaln | Tds::Numericn => {
            let scale = rows
                .iter()
                .filter_map(|row| match row.get(index) {
                    Some(Value::Decimal(d)) => Some(d.scale()),
                    _ => None,
                })
                .max()
                .unwrap_or(DEFAULT_DECIMAL_SCALE);
            ColumnType::Decimal { scale }
        }
        Tds::Daten => ColumnType::Date,
        Tds::Timen => ColumnType::Time,
        Tds::Datetime4
        | Tds::Datetime
        | Tds::Datetimen
        | Tds::Datetime2
        | Tds::DatetimeOffsetn => ColumnType::Timestamp,
        Tds::BigVarBin | Tds::BigBinary | Tds::Image | Tds::Udt => ColumnType::Binary,
        _ => ColumnType::Text,
    }
}

fn convert_cell(data: &ColumnData<'static>) -> SourceResult<Value> {
    let value = match data {
        ColumnData::U8(v) => v.map(|n| Value::Int(n as i64)),
        ColumnData::I16(v) => v.map(|n| Value::Int(n as i64)),
        ColumnData::I32(v) => v.map(|n| Value::Int(n as i64)),
        ColumnData::I64(v) => v.map(Value::Int),
        ColumnData::F32(v) => v.map(|n| Value::Float(n as f64)),
        ColumnData::F64(v) => v.map(Value::Float),
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| Value::Text(s.to_string())),
        ColumnData::Guid(v) => v.as_ref().map(|g| Value::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| Value::Bytes(b.to_vec())),
        ColumnData::Numeric(v) => v.as_ref().map(|n| Value::Decimal(Decimal::new(n.value(), n.scale()))),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|xml| Value::Text(xml.clone().into_owned().into_string())),
        ColumnData::Date(_) => NaiveDate::from_sql(data)?.map(Value::Date),
        ColumnData::Time(_) => NaiveTime::from_sql(data)?.map(Value::Time),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)?.map(Value::Timestamp)
        }
        // Offsets are normalised to UTC
        ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(data)?
            .map(|ts| Value::Timestamp(ts.naive_utc())),
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_money_columns_map_to_double() {
        assert_eq!(column_type(tiberius::ColumnType::Money, 0, &[]), ColumnType::Double);
        assert_eq!(column_type(tiberius::ColumnType::Money4, 0, &[]), ColumnType::Double);
    }

    #[test]
    fn test_decimal_scale_taken_from_values() {
        let rows = vec![
            vec![Value::Decimal(Decimal::new(150, 2))],
            vec![Value::Null],
            vec![Value::Decimal(Decimal::new(15000, 3))],
        ];
        assert_eq!(
            column_type(tiberius::ColumnType::Decimaln, 0, &rows),
            ColumnType::Decimal { scale: 3 }
        );
        assert_eq!(
            column_type(tiberius::ColumnType::Numericn, 0, &[vec![Value::Null]]),
            ColumnType::Decimal {
                scale: DEFAULT_DECIMAL_SCALE
            }
        );
    }

    #[test]
    fn test_other_column_types() {
        assert_eq!(column_type(tiberius::ColumnType::Intn, 0, &[]), ColumnType::BigInt);
        assert_eq!(column_type(tiberius::ColumnType::Bitn, 0, &[]), ColumnType::Boolean);
        assert_eq!(column_type(tiberius::ColumnType::Datetime2, 0, &[]), ColumnType::Timestamp);
        assert_eq!(column_type(tiberius::ColumnType::NVarchar, 0, &[]), ColumnType::Text);
    }

    #[test]
    fn test_convert_cell_nulls_and_values() {
        assert_eq!(convert_cell(&ColumnData::I32(Some(42))).unwrap(), Value::Int(42));
        assert_eq!(convert_cell(&ColumnData::I32(None)).unwrap(), Value::Null);
        assert_eq!(
            convert_cell(&ColumnData::String(Some(Cow::Borrowed("Mugs")))).unwrap(),
            Value::Text("Mugs".to_string())
        );
    }
}
