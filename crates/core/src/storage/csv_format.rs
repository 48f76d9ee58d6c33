use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::warn;
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::holding::{
    BondPosition, DepositPosition, DepositType, FundPosition, Holding, HoldingKind,
    InsurancePosition, ListedPosition, PensionPosition, Position, RiskTag,
};

/// Fixed column layout, one row per holding.
pub const COLUMNS: [&str; 26] = [
    "assetType",
    "name",
    "accountType",
    "quantityOrUnits",
    "acquisitionOrFacePrice",
    "currentPrice",
    "incomeField",
    "currency",
    "amount",
    "depositType",
    "pensionType",
    "totalContribution",
    "benefitStartAge",
    "expectedMonthlyBenefit",
    "maturityDate",
    "couponRate",
    "redemptionPrice",
    "rating",
    "isZeroCoupon",
    "insuranceType",
    "monthlyPremium",
    "surrenderValue",
    "maturityBenefit",
    "insuranceCompany",
    "riskTag",
    "label",
];

const ASSET_TYPE: usize = 0;
const NAME: usize = 1;
const ACCOUNT_TYPE: usize = 2;
const QUANTITY: usize = 3;
const ACQUISITION_PRICE: usize = 4;
const CURRENT_PRICE: usize = 5;
const INCOME: usize = 6;
const CURRENCY: usize = 7;
const AMOUNT: usize = 8;
const DEPOSIT_TYPE: usize = 9;
const PENSION_TYPE: usize = 10;
const TOTAL_CONTRIBUTION: usize = 11;
const BENEFIT_START_AGE: usize = 12;
const EXPECTED_MONTHLY_BENEFIT: usize = 13;
const MATURITY_DATE: usize = 14;
const COUPON_RATE: usize = 15;
const REDEMPTION_PRICE: usize = 16;
const RATING: usize = 17;
const IS_ZERO_COUPON: usize = 18;
const INSURANCE_TYPE: usize = 19;
const MONTHLY_PREMIUM: usize = 20;
const SURRENDER_VALUE: usize = 21;
const MATURITY_BENEFIT: usize = 22;
const INSURANCE_COMPANY: usize = 23;
const RISK_TAG: usize = 24;
const LABEL: usize = 25;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A CSV row that could not be turned into a holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRow {
    /// 1-based line number in the input (the header is line 1)
    pub line: u64,
    pub message: String,
}

/// Result of importing a CSV document. Bad rows never abort the import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub holdings: Vec<Holding>,
    pub skipped: Vec<MalformedRow>,
}

/// Serialize holdings to CSV with a header row.
/// Quoting of commas, quotes and newlines is handled by the writer.
pub fn export_holdings(holdings: &[Holding]) -> Result<String, CoreError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for holding in holdings {
        writer.write_record(to_row(holding))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Csv(format!("Failed to flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Csv(format!("CSV is not UTF-8: {e}")))
}

/// A successfully decoded data row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub line: u64,
    pub holding: Holding,
}

/// Parse holdings from CSV produced by [`export_holdings`].
///
/// Only a wrong header is fatal; each malformed data row is skipped and
/// reported in [`ImportReport::skipped`]. Imported holdings get fresh ids.
pub fn import_holdings(text: &str) -> Result<ImportReport, CoreError> {
    let (rows, skipped) = parse_rows(text)?;
    Ok(ImportReport {
        holdings: rows.into_iter().map(|r| r.holding).collect(),
        skipped,
    })
}

/// Decode every data row, keeping the line number of each good row so
/// callers can report later failures (e.g. validation) against it.
pub fn parse_rows(text: &str) -> Result<(Vec<ParsedRow>, Vec<MalformedRow>), CoreError> {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    if text.trim().is_empty() {
        return Ok((rows, skipped));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.len() != COLUMNS.len() {
        return Err(CoreError::Csv(format!(
            "Expected {} header columns, found {}",
            COLUMNS.len(),
            headers.len()
        )));
    }
    if let Some((position, (found, expected))) = headers
        .iter()
        .zip(COLUMNS)
        .enumerate()
        .find(|(_, (found, expected))| !found.trim().eq_ignore_ascii_case(expected))
    {
        return Err(CoreError::Csv(format!(
            "Header column {} is '{}', expected '{}'",
            position + 1,
            found.trim(),
            expected
        )));
    }

    for (idx, result) in reader.records().enumerate() {
        let fallback_line = idx as u64 + 2;
        let outcome = result
            .map_err(|e| {
                let line = e.position().map_or(fallback_line, |p| p.line());
                (line, e.to_string())
            })
            .and_then(|record| {
                let line = record.position().map_or(fallback_line, |p| p.line());
                from_row(&record)
                    .map(|holding| ParsedRow { line, holding })
                    .map_err(|message| (line, message))
            });

        match outcome {
            Ok(row) => rows.push(row),
            Err((line, message)) => {
                warn!("Skipping CSV line {line}: {message}");
                skipped.push(MalformedRow { line, message });
            }
        }
    }

    Ok((rows, skipped))
}

// ── Row encoding ────────────────────────────────────────────────────

fn to_row(holding: &Holding) -> Vec<String> {
    let mut row = vec![String::new(); COLUMNS.len()];
    row[ASSET_TYPE] = holding.kind().to_string();
    row[CURRENCY] = holding.currency.clone().unwrap_or_default();
    row[RISK_TAG] = holding.risk_tag.to_string();
    row[LABEL] = holding.label.clone();

    match &holding.position {
        Position::Equity(p) | Position::Reit(p) => {
            row[NAME] = p.name.clone();
            row[ACCOUNT_TYPE] = p.account_type.clone();
            row[QUANTITY] = num(p.quantity);
            row[ACQUISITION_PRICE] = num(p.acquisition_price);
            row[CURRENT_PRICE] = opt_num(p.current_price);
            row[INCOME] = opt_num(p.income_per_unit);
        }
        Position::Fund(p) => {
            row[NAME] = p.name.clone();
            row[ACCOUNT_TYPE] = p.account_type.clone();
            row[QUANTITY] = num(p.units);
            row[ACQUISITION_PRICE] = num(p.acquisition_price);
            row[CURRENT_PRICE] = opt_num(p.current_price);
            row[INCOME] = opt_num(p.distribution_per_10k_units);
        }
        Position::Bond(p) => {
            row[NAME] = p.name.clone();
            row[QUANTITY] = num(p.units);
            row[ACQUISITION_PRICE] = num(p.acquisition_price);
            row[MATURITY_DATE] = opt_date(p.maturity_date);
            row[COUPON_RATE] = opt_num(p.coupon_rate_percent);
            row[REDEMPTION_PRICE] = num(p.redemption_price);
            row[RATING] = p.rating.clone().unwrap_or_default();
            row[IS_ZERO_COUPON] = p.is_zero_coupon.to_string();
        }
        Position::Deposit(p) => {
            row[NAME] = p.bank_name.clone();
            row[AMOUNT] = num(p.amount);
            row[DEPOSIT_TYPE] = p.deposit_type.to_string();
            row[INCOME] = opt_num(p.interest_rate_percent);
        }
        Position::Pension(p) => {
            row[PENSION_TYPE] = p.pension_type.clone();
            row[TOTAL_CONTRIBUTION] = opt_num(p.total_contribution);
            row[BENEFIT_START_AGE] = p.benefit_start_age.map(|a| a.to_string()).unwrap_or_default();
            row[EXPECTED_MONTHLY_BENEFIT] = num(p.expected_monthly_benefit);
        }
        Position::Insurance(p) => {
            row[INSURANCE_TYPE] = p.insurance_type.clone();
            row[MONTHLY_PREMIUM] = num(p.monthly_premium);
            row[SURRENDER_VALUE] = opt_num(p.surrender_value);
            row[MATURITY_BENEFIT] = opt_num(p.maturity_benefit);
            row[INSURANCE_COMPANY] = p.company.clone().unwrap_or_default();
            row[MATURITY_DATE] = opt_date(p.maturity_date);
        }
    }

    row
}

fn num(value: f64) -> String {
    value.to_string()
}

fn opt_num(value: Option<f64>) -> String {
    value.map(num).unwrap_or_default()
}

fn opt_date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

// ── Row decoding ────────────────────────────────────────────────────

fn from_row(record: &StringRecord) -> Result<Holding, String> {
    if record.len() != COLUMNS.len() {
        return Err(format!(
            "expected {} columns, found {}",
            COLUMNS.len(),
            record.len()
        ));
    }
    let row = Row(record);

    let kind = HoldingKind::parse(row.raw(ASSET_TYPE))
        .ok_or_else(|| format!("unknown asset type '{}'", row.raw(ASSET_TYPE)))?;

    let position = match kind {
        HoldingKind::Equity | HoldingKind::Reit => {
            let listed = ListedPosition {
                name: row.text(NAME),
                quantity: row.required_num(QUANTITY)?,
                acquisition_price: row.required_num(ACQUISITION_PRICE)?,
                current_price: row.optional_num(CURRENT_PRICE)?,
                income_per_unit: row.optional_num(INCOME)?,
                account_type: row.text(ACCOUNT_TYPE),
            };
            if kind == HoldingKind::Equity {
                Position::Equity(listed)
            } else {
                Position::Reit(listed)
            }
        }
        HoldingKind::Fund => Position::Fund(FundPosition {
            name: row.text(NAME),
            units: row.required_num(QUANTITY)?,
            acquisition_price: row.required_num(ACQUISITION_PRICE)?,
            current_price: row.optional_num(CURRENT_PRICE)?,
            distribution_per_10k_units: row.optional_num(INCOME)?,
            account_type: row.text(ACCOUNT_TYPE),
        }),
        HoldingKind::Bond => Position::Bond(BondPosition {
            name: row.text(NAME),
            units: row.required_num(QUANTITY)?,
            acquisition_price: row.required_num(ACQUISITION_PRICE)?,
            maturity_date: row.optional_date(MATURITY_DATE)?,
            coupon_rate_percent: row.optional_num(COUPON_RATE)?,
            is_zero_coupon: row.flag(IS_ZERO_COUPON)?,
            redemption_price: row.required_num(REDEMPTION_PRICE)?,
            rating: row.optional_text(RATING),
        }),
        HoldingKind::Deposit => Position::Deposit(DepositPosition {
            bank_name: row.text(NAME),
            amount: row.required_num(AMOUNT)?,
            deposit_type: match row.raw(DEPOSIT_TYPE).trim() {
                "" => DepositType::default(),
                s => DepositType::parse(s).ok_or_else(|| format!("unknown deposit type '{s}'"))?,
            },
            interest_rate_percent: row.optional_num(INCOME)?,
        }),
        HoldingKind::Pension => Position::Pension(PensionPosition {
            pension_type: row.text(PENSION_TYPE),
            total_contribution: row.optional_num(TOTAL_CONTRIBUTION)?,
            benefit_start_age: row.optional_age(BENEFIT_START_AGE)?,
            expected_monthly_benefit: row.required_num(EXPECTED_MONTHLY_BENEFIT)?,
        }),
        HoldingKind::Insurance => Position::Insurance(InsurancePosition {
            insurance_type: row.text(INSURANCE_TYPE),
            monthly_premium: row.required_num(MONTHLY_PREMIUM)?,
            surrender_value: row.optional_num(SURRENDER_VALUE)?,
            maturity_benefit: row.optional_num(MATURITY_BENEFIT)?,
            company: row.optional_text(INSURANCE_COMPANY),
            maturity_date: row.optional_date(MATURITY_DATE)?,
        }),
    };

    let risk_tag = match row.raw(RISK_TAG).trim() {
        "" => RiskTag::default(),
        s => RiskTag::parse(s).ok_or_else(|| format!("unknown risk tag '{s}'"))?,
    };

    let mut holding = Holding::new(position)
        .with_risk(risk_tag)
        .with_label(row.text(LABEL));
    if let Some(currency) = row.optional_text(CURRENCY) {
        holding = holding.with_currency(currency);
    }
    Ok(holding)
}

/// Typed accessors over one record. Errors name the offending column.
struct Row<'a>(&'a StringRecord);

impl Row<'_> {
    fn raw(&self, idx: usize) -> &str {
        self.0.get(idx).unwrap_or("")
    }

    fn text(&self, idx: usize) -> String {
        self.raw(idx).to_string()
    }

    fn optional_text(&self, idx: usize) -> Option<String> {
        let value = self.raw(idx);
        if value.trim().is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn optional_num(&self, idx: usize) -> Result<Option<f64>, String> {
        let value = self.raw(idx).trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("{} is not a number: '{value}'", COLUMNS[idx]))
    }

    fn required_num(&self, idx: usize) -> Result<f64, String> {
        self.optional_num(idx)?
            .ok_or_else(|| format!("{} is required", COLUMNS[idx]))
    }

    fn optional_age(&self, idx: usize) -> Result<Option<u32>, String> {
        let value = self.raw(idx).trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| format!("{} is not a whole number: '{value}'", COLUMNS[idx]))
    }

    fn optional_date(&self, idx: usize) -> Result<Option<NaiveDate>, String> {
        let value = self.raw(idx).trim();
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("{} is not a YYYY-MM-DD date: '{value}'", COLUMNS[idx]))
    }

    fn flag(&self, idx: usize) -> Result<bool, String> {
        match self.raw(idx).trim().to_ascii_lowercase().as_str() {
            "" | "false" | "0" | "no" => Ok(false),
            "true" | "1" | "yes" => Ok(true),
            other => Err(format!("{} is not a boolean: '{other}'", COLUMNS[idx])),
        }
    }
}
