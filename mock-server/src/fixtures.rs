//! Canned payloads in the shape the investor API returns them.

use serde_json::{json, Value};

pub fn account_summary(account_id: u64) -> Value {
    json!({
        "investorId": account_id,
        "availableCash": 50.77,
        "accountTotal": 100.15,
        "accruedInterest": 0.26,
        "infundingBalance": 0,
        "receivedInterest": 0.16,
        "receivedPrincipal": 0.62,
        "receivedLateFees": 0,
        "outstandingPrincipal": 49.38,
        "totalNotes": 2,
        "totalPortfolios": 3
    })
}

pub fn available_cash(account_id: u64) -> Value {
    json!({
        "investorId": account_id,
        "availableCash": 50.77
    })
}

pub fn pending_transfers() -> Value {
    json!({
        "transfers": [
            {
                "transferId": 1164216018,
                "transferDate": "2015-12-23T00:00:00.000-08:00",
                "amount": 25.0,
                "sourceAccount": "samplebank",
                "status": "Scheduled",
                "frequency": "One Time",
                "endDate": null,
                "operation": "ADD_FUNDS",
                "cancellable": "true"
            },
            {
                "transferId": 34074843,
                "transferDate": "2015-01-23T00:00:00.000-0800",
                "amount": 100,
                "sourceAccount": "samplebank",
                "status": "Scheduled",
                "frequency": "1st and 16th of each Month",
                "endDate": "2015-01-29T00:00:00.000-0800",
                "operation": "ADD_FUNDS",
                "cancellable": "true"
            }
        ]
    })
}

pub fn owned_notes(detailed: bool) -> Value {
    let mut note = json!({
        "loanId": 11111,
        "noteId": 22222,
        "orderId": 33333,
        "interestRate": 13.57,
        "loanLength": 36,
        "loanStatus": "Late (31-120 days)",
        "grade": "C",
        "loanAmount": 10800,
        "noteAmount": 25,
        "paymentsReceived": 5.88,
        "issueDate": "2009-11-12T06:34:02.000-08:00",
        "orderDate": "2009-11-05T09:33:50.000-08:00",
        "loanStatusDate": "2013-05-20T13:13:53.000-07:00"
    });

    if detailed {
        note["nextPaymentDate"] = json!("2013-06-12T00:00:00.000-07:00");
        note["principalPending"] = json!(19.12);
        note["currentPaymentStatus"] = json!("LATE");
    }

    json!({ "myNotes": [note] })
}

pub fn loan_listing(show_all: bool) -> Value {
    let mut loans = vec![json!({
        "id": 111111,
        "memberId": 222222,
        "loanAmount": 1750.0,
        "fundedAmount": 25.0,
        "term": 36,
        "intRate": 10.99,
        "grade": "B",
        "subGrade": "B3",
        "homeOwnership": "OWN",
        "isIncV": "Requested",
        "acceptD": "2014-08-25T10:56:29.000-07:00",
        "expD": "2014-09-08T10:57:13.000-07:00",
        "listD": "2014-08-25T10:50:20.000-07:00",
        "creditPullD": "2014-08-25T10:56:18.000-07:00",
        "reviewStatusD": "2014-09-03T14:41:53.957-07:00",
        "reviewStatus": "NOT_APPROVED",
        "purpose": "debt_consolidation",
        "addrState": "CA",
        "ilsExpD": "2014-08-25T11:00:00.000-07:00",
        "earliestCrLine": "1984-09-15T00:00:00.000-07:00"
    })];

    if show_all {
        loans.push(json!({
            "id": 333333,
            "memberId": 444444,
            "loanAmount": 12000.0,
            "fundedAmount": 9000.0,
            "term": 60,
            "intRate": 15.61,
            "grade": "D",
            "subGrade": "D1",
            "homeOwnership": "RENT",
            "isIncV": "VERIFIED",
            "acceptD": "2014-08-20T08:00:00.000-07:00",
            "expD": "2014-09-03T08:00:00.000-07:00",
            "listD": "2014-08-20T09:00:00.000-07:00",
            "creditPullD": "2014-08-20T07:59:00.000-07:00",
            "reviewStatusD": "2014-08-21T10:00:00.000-07:00",
            "reviewStatus": "APPROVED",
            "purpose": "credit_card",
            "addrState": "NY",
            "ilsExpD": null,
            "earliestCrLine": "1999-02-01T00:00:00.000-08:00"
        }));
    }

    json!({
        "asOfDate": "2014-09-03T14:41:53.959-07:00",
        "loans": loans
    })
}
