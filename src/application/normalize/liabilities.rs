use super::{account_fragment, money, non_blank, parse_date, NormalizeContext, Normalized};
use crate::domain::entities::liability::{
    CreditDetails, Liability, LiabilityDetails, LoanDetails, MortgageDetails,
};
use crate::domain::error::NormalizationError;
use crate::domain::provider::plaid::{
    CreditCardLiability, LiabilitiesResponse, MortgageLiability, PropertyAddress, StudentLoan,
};
use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::{AssetId, LiabilityId};
use std::collections::HashMap;

const PURCHASE_APR: &str = "purchase_apr";
const STUDENT_LOAN_TYPE: &str = "student";

/// Credit cards, mortgages and student loans become liabilities attached to
/// their account. Accounts with no liability are not emitted.
pub fn normalize_liabilities(resp: &LiabilitiesResponse, ctx: &NormalizeContext) -> Normalized {
    let institution = ctx.institution(resp.item.as_ref());
    let object = &resp.liabilities;

    let credit = object.credit.iter().flatten().filter_map(map_credit);
    let mortgage = object.mortgage.iter().flatten().filter_map(map_mortgage);
    let student = object.student.iter().flatten().filter_map(map_student_loan);

    let mut by_account: HashMap<AssetId, Vec<Liability>> = HashMap::new();
    for liability in credit.chain(mortgage).chain(student) {
        by_account
            .entry(liability.account_id.clone())
            .or_default()
            .push(liability);
    }

    let mut out = Normalized::default();
    for account in &resp.accounts {
        let Some(mut fragment) = account_fragment(account, institution) else {
            out.errors.push(NormalizationError::MissingAccountId {
                context: "liabilities",
            });
            continue;
        };
        if let Some(liabilities) = by_account.remove(&fragment.id) {
            fragment.liabilities = liabilities;
            out.fragments.push(fragment);
        }
    }
    out
}

/// Identity is the account plus the liability kind, so a card and a loan on
/// one account stay distinct while repeated observations collapse.
fn liability(account_id: &str, details: LiabilityDetails) -> Liability {
    Liability {
        id: LiabilityId::new(format!("{account_id}-{}", details.kind())),
        account_id: AssetId::new(account_id),
        data_source: DataSource::Plaid,
        last_payment_date: None,
        last_payment_amount: None,
        next_payment_date: None,
        details,
    }
}

fn map_credit(raw: &CreditCardLiability) -> Option<Liability> {
    let account_id = non_blank(&raw.account_id)?;
    let apr = raw
        .aprs
        .iter()
        .find(|a| a.apr_type.as_deref() == Some(PURCHASE_APR))
        .or_else(|| raw.aprs.first());

    let mut out = liability(
        account_id,
        LiabilityDetails::Credit(CreditDetails {
            interest_percentage: apr.and_then(|a| a.apr_percentage),
            minimum_payment_amount: money(raw.minimum_payment_amount),
            last_statement_balance: money(raw.last_statement_balance),
            last_statement_date: parse_date(&raw.last_statement_issue_date),
            is_overdue: raw.is_overdue,
        }),
    );
    out.last_payment_date = parse_date(&raw.last_payment_date);
    out.last_payment_amount = money(raw.last_payment_amount);
    out.next_payment_date = parse_date(&raw.next_payment_due_date);
    Some(out)
}

fn map_mortgage(raw: &MortgageLiability) -> Option<Liability> {
    let account_id = non_blank(&raw.account_id)?;
    let rate = raw.interest_rate.as_ref();

    let mut out = liability(
        account_id,
        LiabilityDetails::Mortgage(MortgageDetails {
            interest_type: rate.and_then(|r| r.rate_type.clone()),
            interest_percentage: rate.and_then(|r| r.percentage),
            origination_date: parse_date(&raw.origination_date),
            maturity_date: parse_date(&raw.maturity_date),
            principal_amount: money(raw.origination_principal_amount),
            paid_principal_amount: money(raw.ytd_principal_paid),
            paid_interest_amount: money(raw.ytd_interest_paid),
            loan_term: raw.loan_term.clone(),
            property_address: raw.property_address.as_ref().and_then(format_address),
        }),
    );
    out.last_payment_date = parse_date(&raw.last_payment_date);
    out.last_payment_amount = money(raw.last_payment_amount);
    out.next_payment_date = parse_date(&raw.next_payment_due_date);
    Some(out)
}

fn map_student_loan(raw: &StudentLoan) -> Option<Liability> {
    let account_id = non_blank(&raw.account_id)?;

    let mut out = liability(
        account_id,
        LiabilityDetails::Loan(LoanDetails {
            loan_type: STUDENT_LOAN_TYPE.to_string(),
            loan_name: raw.loan_name.clone(),
            interest_percentage: raw.interest_rate_percentage,
            origination_date: parse_date(&raw.origination_date),
            maturity_date: raw.loan_status.as_ref().and_then(|s| parse_date(&s.end_date)),
            principal_amount: money(raw.origination_principal_amount),
            outstanding_interest_amount: money(raw.outstanding_interest_amount),
            paid_principal_amount: money(raw.ytd_principal_paid),
            paid_interest_amount: money(raw.ytd_interest_paid),
        }),
    );
    out.last_payment_date = parse_date(&raw.last_payment_date);
    out.last_payment_amount = money(raw.last_payment_amount);
    out.next_payment_date = parse_date(&raw.next_payment_due_date);
    Some(out)
}

fn format_address(addr: &PropertyAddress) -> Option<String> {
    let parts: Vec<&str> = [
        &addr.street,
        &addr.city,
        &addr.region,
        &addr.postal_code,
        &addr.country,
    ]
    .into_iter()
    .filter_map(non_blank)
    .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
