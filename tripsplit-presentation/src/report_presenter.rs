use std::{borrow::Cow, fmt::Write as _};
use tripsplit_application::{MemberDirectory, SettlementResult};
use tripsplit_domain::{ParticipantId, PersonBalance, Transfer, Trip};

const REPORT_DECIMALS: u32 = 2;
const NO_TRANSFERS: &str = "(none)";

pub struct TripReportPresenter;

impl TripReportPresenter {
    /// Renders both balance snapshots around the payment list.
    pub fn render(
        trip: &Trip,
        result: &SettlementResult,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "balances for {} {} before settling up:",
            trip.label(),
            trip.year()
        );
        out.push_str(&Self::render_balances(
            &result.balances_before,
            member_directory,
        ));
        out.push('\n');

        out.push_str("payments to settle up:\n");
        out.push_str(&Self::render_transfers(&result.transfers, member_directory));
        out.push('\n');

        let _ = writeln!(
            out,
            "balances for {} {} after settling up:",
            trip.label(),
            trip.year()
        );
        out.push_str(&Self::render_balances(
            &result.balances_after,
            member_directory,
        ));
        out
    }

    /// One `<name>: <balance>` line per row, in the order given.
    ///
    /// `SettlementResult` snapshots already come ascending by balance.
    pub fn render_balances(
        person_balances: &[PersonBalance],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut out = String::new();
        for person in person_balances {
            let _ = writeln!(
                out,
                "{}: {}",
                format_member_label(person.id, member_directory),
                person.balance.to_fixed(REPORT_DECIMALS)
            );
        }
        out
    }

    /// Transfers keep their generation order.
    pub fn render_transfers(
        transfers: &[Transfer],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        if transfers.is_empty() {
            return format!("{NO_TRANSFERS}\n");
        }

        let mut out = String::new();
        for transfer in transfers {
            let _ = writeln!(
                out,
                "{} pays {} to {}",
                format_member_label(transfer.from, member_directory),
                transfer.amount.to_fixed(REPORT_DECIMALS),
                format_member_label(transfer.to, member_directory)
            );
        }
        out
    }
}

fn format_member_label<'a>(
    member_id: ParticipantId,
    member_directory: &'a dyn MemberDirectory,
) -> Cow<'a, str> {
    match member_directory.display_name(member_id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(member_id.to_string()),
    }
}
