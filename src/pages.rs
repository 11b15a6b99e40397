//! Server-rendered HTML for the browser views.
//!
//! The pages are small enough that they are built with `write!` into a
//! `String`; every value that originates from user input goes through
//! [`escape`].

use std::fmt::Write;

use chrono::NaiveDate;

use crate::{entities::vegetable_sale, services::reports::Report};

/// Escapes text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn amount(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
table {{ border-collapse: collapse; margin: 1rem 0; }}
th, td {{ border: 1px solid #ccc; padding: .3rem .6rem; text-align: right; }}
th:first-child, td:first-child {{ text-align: left; }}
nav a {{ margin-right: 1rem; }}
.message {{ color: #a33; }}
</style>
</head>
<body>
<nav><a href="/">Daily entries</a><a href="/report">Report</a><a href="/monthly-analysis">Monthly analysis</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

/// Daily entry page: one editable row per record for `date`.
pub fn vegetable_list(date: NaiveDate, records: &[vegetable_sale::Model]) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<form id="date-form"><label>Date <input type="date" name="date" value="{date}"></label>
<button type="submit">Set date</button></form>
<form id="save-form">
<table>
<thead><tr><th>Vegetable</th><th>Quantity</th><th>Purchase price</th><th>Selling price</th><th></th></tr></thead>
<tbody>
"#
    );

    for record in records {
        let name = escape(&record.vegetable);
        let _ = write!(
            body,
            r#"<tr data-id="{id}"><td>{name}</td>
<td><input type="number" step="any" min="0" name="quantity_{id}" value="{quantity}"></td>
<td><input type="number" step="any" min="0" name="purchase_price_{id}" value="{purchase}"></td>
<td><input type="number" step="any" min="0" name="selling_price_{id}" value="{selling}"></td>
<td><button type="button" class="delete" data-name="{name}">Delete</button></td></tr>
"#,
            id = record.id,
            quantity = amount(record.quantity),
            purchase = amount(record.purchase_price),
            selling = amount(record.selling_price),
        );
    }

    body.push_str(
        r#"</tbody>
</table>
<button type="submit">Save</button>
<button type="button" id="calculate">Calculate totals</button>
</form>
<form id="add-form"><input name="vegetable_name" placeholder="Vegetable name" maxlength="100">
<button type="submit">Add vegetable</button></form>
<p id="status" class="message"></p>
<div id="totals"></div>
<script>
const post = (url, data) => fetch(url, { method: "POST", body: new URLSearchParams(data) }).then(r => r.json());
const status = m => { document.getElementById("status").textContent = m; };
document.getElementById("date-form").onsubmit = e => {
  e.preventDefault();
  post("/set_date", new FormData(e.target)).then(r => r.success ? location.reload() : status(r.message));
};
document.getElementById("save-form").onsubmit = e => {
  e.preventDefault();
  post("/save", new FormData(e.target)).then(r => status(r.message));
};
document.getElementById("add-form").onsubmit = e => {
  e.preventDefault();
  post("/add", new FormData(e.target)).then(r => r.success ? location.reload() : status(r.message));
};
document.querySelectorAll("button.delete").forEach(b => b.onclick = () =>
  post("/delete", { vegetable_name: b.dataset.name }).then(r => r.success ? location.reload() : status(r.message)));
document.getElementById("calculate").onclick = () => post("/calculate", {}).then(r => {
  document.getElementById("totals").textContent =
    `Purchase ${r.total_purchase_price} | Selling ${r.total_selling_price} | Profit ${r.profit} | Loss ${r.loss}`;
});
</script>
"#,
    );

    layout(&format!("Vegetables for {}", date), &body)
}

/// Report page; `None` renders just the date picker.
pub fn report(report: Option<&Report>) -> String {
    let mut body = String::new();
    let selected = report.map(|r| r.date.to_string()).unwrap_or_default();

    let _ = write!(
        body,
        r#"<form method="post" action="/report">
<label>Date <input type="date" name="selected_date" value="{selected}"></label>
<button type="submit">Show report</button>
<button type="submit" name="show_chart" value="1">Quantity analysis</button>
</form>
"#
    );

    let Some(report) = report else {
        return layout("Report", &body);
    };

    if let Some(message) = &report.message {
        let _ = writeln!(body, r#"<p class="message">{}</p>"#, escape(message));
    }

    if !report.lines.is_empty() {
        body.push_str(
            "<table>\n<thead><tr><th>Vegetable</th><th>Quantity</th><th>Purchase price</th>\
             <th>Selling price</th><th>Total purchase</th><th>Total selling</th>\
             <th>Profit</th><th>Loss</th></tr></thead>\n<tbody>\n",
        );
        for line in &report.lines {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&line.vegetable),
                line.quantity,
                money(line.purchase_price),
                money(line.selling_price),
                money(line.total_purchase),
                money(line.total_selling),
                money(line.profit),
                money(line.loss),
            );
        }
        body.push_str("</tbody>\n");

        if let Some(summary) = &report.summary {
            let _ = writeln!(
                body,
                "<tfoot><tr><th>Total</th><td></td><td></td><td></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tfoot>",
                money(summary.total_purchase),
                money(summary.total_selling),
                money(summary.profit),
                money(summary.loss),
            );
        }
        body.push_str("</table>\n");
    }

    if let Some(chart) = &report.chart {
        let _ = writeln!(
            body,
            r#"<img alt="Quantity Analysis for {}" src="{}">"#,
            report.date,
            escape(chart)
        );
    }

    layout(&format!("Report for {}", report.date), &body)
}

pub fn monthly_analysis() -> String {
    let body = r#"<form id="month-form"><label>Month <input type="month" name="month" required></label>
<button type="submit">Analyse</button></form>
<p id="status" class="message"></p>
<table id="summary" hidden>
<tr><th>Total investment</th><td data-key="total_investment"></td></tr>
<tr><th>Total revenue</th><td data-key="total_revenue"></td></tr>
<tr><th>Total profit</th><td data-key="total_profit"></td></tr>
<tr><th>Total loss</th><td data-key="total_loss"></td></tr>
</table>
<table id="vegetables" hidden>
<thead><tr><th>Vegetable</th><th>Quantity</th><th>Profit</th><th>Loss</th></tr></thead>
<tbody></tbody>
</table>
<img id="quantity-chart" alt="Vegetable quantity analysis" hidden>
<script>
document.getElementById("month-form").onsubmit = async e => {
  e.preventDefault();
  const month = new FormData(e.target).get("month");
  const res = await fetch(`/ajax/monthly-analysis-data?month=${encodeURIComponent(month)}`);
  const data = await res.json();
  const status = document.getElementById("status");
  if (!res.ok) { status.textContent = data.error; return; }
  status.textContent = data.vegetables.length ? "" : "No records for this month.";
  const summary = document.getElementById("summary");
  summary.querySelectorAll("td").forEach(td => { td.textContent = data.summary[td.dataset.key].toFixed(2); });
  summary.hidden = false;
  const table = document.getElementById("vegetables");
  const tbody = table.querySelector("tbody");
  tbody.replaceChildren(...data.vegetables.map(v => {
    const tr = document.createElement("tr");
    for (const value of [v.vegetable, v.quantity, v.profit.toFixed(2), v.loss.toFixed(2)]) {
      const td = document.createElement("td");
      td.textContent = value;
      tr.appendChild(td);
    }
    return tr;
  }));
  table.hidden = false;
  const img = document.getElementById("quantity-chart");
  if (data.quantity_chart) {
    img.src = data.quantity_chart;
    img.hidden = false;
  } else {
    img.hidden = true;
  }
};
</script>
"#;

    layout("Monthly analysis", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{ReportLine, ReportTotals};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape(r#"<b>"Okra" & 'Yam'</b>"#),
            "&lt;b&gt;&quot;Okra&quot; &amp; &#x27;Yam&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn list_page_names_inputs_by_record_id() {
        let records = vec![vegetable_sale::Model {
            id: 42,
            date: date(),
            vegetable: "<Onion>".into(),
            quantity: Some(10.0),
            purchase_price: None,
            selling_price: Some(8.5),
        }];
        let html = vegetable_list(date(), &records);

        assert!(html.contains(r#"name="quantity_42" value="10""#));
        assert!(html.contains(r#"name="purchase_price_42" value="""#));
        assert!(html.contains(r#"name="selling_price_42" value="8.5""#));
        assert!(html.contains("&lt;Onion&gt;"));
        assert!(!html.contains("<Onion>"));
    }

    #[test]
    fn report_page_shows_message_when_nothing_qualifies() {
        let report = Report {
            date: date(),
            lines: vec![],
            summary: None,
            message: Some("No vegetables were purchased on this date.".into()),
            chart: None,
        };
        let html = report_page_html(&report);
        assert!(html.contains("No vegetables were purchased on this date."));
        assert!(!html.contains("<tbody>"));
    }

    #[test]
    fn report_page_lists_rows_and_totals() {
        let line = ReportLine {
            vegetable: "Onion".into(),
            quantity: 10.0,
            purchase_price: 5.0,
            selling_price: 8.0,
            total_purchase: 50.0,
            total_selling: 80.0,
            profit: 30.0,
            loss: 0.0,
        };
        let summary = ReportTotals::from_lines([&line]);
        let report = Report {
            date: date(),
            lines: vec![line],
            summary: Some(summary),
            message: None,
            chart: Some("data:image/png;base64,AAAA".into()),
        };
        let html = report_page_html(&report);

        assert!(html.contains("<td>Onion</td><td>10</td><td>5.00</td>"));
        assert!(html.contains("<tfoot>"));
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
    }

    fn report_page_html(report: &Report) -> String {
        super::report(Some(report))
    }
}
