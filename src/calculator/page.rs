use std::fmt::Write;

use super::form::CalculatorForm;
use crate::projects::ProjectId;
use crate::valuation::format::{format_currency, format_number};
use crate::valuation::{DebrisLevel, SlopeCondition, TreeDensity, ValuationResult};

pub(crate) enum PageOutcome<'a> {
    Blank,
    Calculated {
        result: &'a ValuationResult,
        project_id: &'a ProjectId,
    },
    Rejected(&'a [&'a str]),
}

pub(crate) fn render(
    form: &CalculatorForm,
    major_counties: &[String],
    outcome: PageOutcome<'_>,
) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Land Value Calculator</title></head>\n<body>\n<h1>Land Value Calculator</h1>\n",
    );

    if let PageOutcome::Rejected(errors) = &outcome {
        html.push_str("<ul class=\"errors\">\n");
        for error in errors.iter() {
            writeln!(html, "<li>{}</li>", escape(error)).expect("write error item");
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<form method=\"post\" action=\"/calculator\">\n");
    text_input(
        &mut html,
        "property_address",
        "Property address",
        form.property_address.as_deref(),
    );
    text_input(&mut html, "acres", "Acres", form.acres.as_deref());
    text_input(
        &mut html,
        "base_value",
        "Base value ($)",
        form.base_value.as_deref(),
    );
    select(
        &mut html,
        "debris_level",
        "Debris level",
        &[DebrisLevel::None, DebrisLevel::Moderate, DebrisLevel::Heavy].map(DebrisLevel::label),
        form.debris_level.as_deref(),
    );
    select(
        &mut html,
        "slope",
        "Slope",
        &[SlopeCondition::None, SlopeCondition::Moderate, SlopeCondition::Steep]
            .map(SlopeCondition::label),
        form.slope.as_deref(),
    );
    select(
        &mut html,
        "tree_density",
        "Tree density",
        &[TreeDensity::None, TreeDensity::Moderate, TreeDensity::Heavy].map(TreeDensity::label),
        form.tree_density.as_deref(),
    );
    checkbox(
        &mut html,
        "needs_well",
        "Needs a well",
        form.needs_well.is_some(),
    );
    checkbox(
        &mut html,
        "contamination_risk",
        "Contamination risk",
        form.contamination_risk.is_some(),
    );
    checkbox(
        &mut html,
        "flood_zone",
        "In a flood zone",
        form.flood_zone.is_some(),
    );
    let counties = major_counties.join(", ");
    text_input(
        &mut html,
        "county",
        &format!("County (premium: {counties})"),
        form.county.as_deref(),
    );
    html.push_str("<button type=\"submit\">Calculate</button>\n</form>\n");

    if let PageOutcome::Calculated { result, project_id } = outcome {
        let impact = result.impact();
        write!(
            html,
            "<section class=\"result\" data-project-id=\"{project}\">\n<h2>Calculation Results</h2>\n<table>\n",
            project = escape(&project_id.0)
        )
        .expect("write result header");
        result_row(&mut html, "Total Acres", &format_number(result.total_acres));
        result_row(&mut html, "Base Value", &format_currency(result.base_value));
        result_row(
            &mut html,
            "Site Preparation Costs",
            &format_currency(result.site_prep_cost),
        );
        result_row(
            &mut html,
            "Adjusted Value",
            &format_currency(result.adjusted_value),
        );
        result_row(
            &mut html,
            "Final Property Value",
            &format_currency(result.final_value),
        );
        result_row(
            &mut html,
            "Value per Acre",
            &format_currency(result.value_per_acre),
        );
        result_row(&mut html, "Total Value Impact", &impact.to_string());
        html.push_str("</table>\n</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn text_input(html: &mut String, name: &str, label: &str, value: Option<&str>) {
    writeln!(
        html,
        "<label for=\"{name}\">{label}</label> <input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\"><br>",
        label = escape(label),
        value = escape(value.unwrap_or_default()),
    )
    .expect("write text input");
}

fn select(html: &mut String, name: &str, label: &str, options: &[&str], selected: Option<&str>) {
    let selected = selected.map(|value| value.trim().to_ascii_lowercase());
    write!(
        html,
        "<label for=\"{name}\">{label}</label> <select id=\"{name}\" name=\"{name}\">"
    )
    .expect("write select");
    for option in options {
        let marker = if selected.as_deref() == Some(*option) {
            " selected"
        } else {
            ""
        };
        write!(html, "<option value=\"{option}\"{marker}>{option}</option>")
            .expect("write option");
    }
    html.push_str("</select><br>\n");
}

fn checkbox(html: &mut String, name: &str, label: &str, checked: bool) {
    let marker = if checked { " checked" } else { "" };
    writeln!(
        html,
        "<label><input type=\"checkbox\" name=\"{name}\"{marker}> {label}</label><br>"
    )
    .expect("write checkbox");
}

fn result_row(html: &mut String, label: &str, value: &str) {
    writeln!(html, "<tr><th>{label}</th><td>{}</td></tr>", escape(value))
        .expect("write result row");
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
