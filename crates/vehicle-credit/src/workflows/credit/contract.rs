use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus};

const DEFAULT_INSTITUTION_NAME: &str = "PT BCA Finance";
const DEFAULT_CONTRACT_CODE: &str = "BCAF";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("application {id} is {} and has no contract until approved", .status.label())]
    NotApproved {
        id: ApplicationId,
        status: ApplicationStatus,
    },
}

/// Institution constants stamped onto every contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTemplate {
    pub institution_name: String,
    pub contract_code: String,
}

impl Default for ContractTemplate {
    fn default() -> Self {
        Self {
            institution_name: DEFAULT_INSTITUTION_NAME.to_string(),
            contract_code: DEFAULT_CONTRACT_CODE.to_string(),
        }
    }
}

/// Rendered agreement plus the filename suggested for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractDocument {
    pub contract_number: String,
    pub filename: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContractRenderer {
    template: ContractTemplate,
}

impl ContractRenderer {
    pub fn new(template: ContractTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &ContractTemplate {
        &self.template
    }

    /// Fill the credit agreement for an approved application.
    ///
    /// Output depends only on `record`, `now` and the template, so repeated calls with the
    /// same arguments produce identical bytes. Amounts come from the stored record; the
    /// installment is never recomputed here.
    pub fn render(
        &self,
        record: &ApplicationRecord,
        now: NaiveDateTime,
    ) -> Result<ContractDocument, RenderError> {
        if record.status != ApplicationStatus::Approved {
            return Err(RenderError::NotApproved {
                id: record.id.clone(),
                status: record.status,
            });
        }

        let contract_number = format!(
            "{}/{}/{}",
            record.id,
            self.template.contract_code,
            now.year()
        );
        let applicant = &record.applicant;
        let financing = &record.financing;

        let body = format!(
            "PERJANJIAN KREDIT KENDARAAN\n\
             Nomor: {contract_number}\n\
             \n\
             PARA PIHAK:\n\
             1. {institution} (PEMBERI KREDIT)\n\
             2. {customer} - NIK: {nik} (PENERIMA KREDIT)\n\
             \n\
             OBJEK KREDIT: {vehicle}\n\
             \n\
             RINCIAN PEMBIAYAAN:\n\
             - Harga Kendaraan: Rp {price}\n\
             - Uang Muka (DP): Rp {dp}\n\
             - Jumlah Pembiayaan: Rp {principal}\n\
             - Tenor: {tenor} bulan\n\
             - Angsuran per Bulan: Rp {installment}\n\
             \n\
             Tanggal: {date}\n\
             \n\
             [Tanda Tangan Digital]\n\
             Pihak Pertama          Pihak Kedua\n",
            institution = self.template.institution_name,
            customer = applicant.customer_name,
            nik = applicant.nik,
            vehicle = financing.vehicle,
            price = format_rupiah(financing.loan_amount),
            dp = format_rupiah(financing.dp),
            principal = format_rupiah(financing.principal()),
            tenor = financing.tenor.months(),
            installment = format_rupiah(financing.monthly_payment),
            date = now.format("%-d/%-m/%Y"),
        );

        Ok(ContractDocument {
            contract_number,
            filename: contract_filename(record),
            body,
        })
    }
}

/// `Kontrak_<id>_<customer name, whitespace replaced by underscores>.txt`
pub fn contract_filename(record: &ApplicationRecord) -> String {
    let name: String = record
        .applicant
        .customer_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("Kontrak_{}_{}.txt", record.id, name)
}

/// Indonesian currency grouping: `.` between thousands, `,` before up to three decimals.
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = amount.round_dp(3).normalize();
    let digits = rounded.abs().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push(',');
        grouped.push_str(fraction);
    }
    grouped
}
