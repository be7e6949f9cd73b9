//! CSV rendering for the export endpoints.

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::error::ServiceError;
use crate::models::{Interaction, Person};

const PEOPLE_HEADER: [&str; 8] = [
    "id",
    "nome",
    "email",
    "telefone",
    "bairro",
    "cidade",
    "observacoes",
    "criado_em",
];

const INTERACTIONS_HEADER: [&str; 9] = [
    "id",
    "pessoa_id",
    "assunto",
    "tipo",
    "status",
    "descricao",
    "inicio",
    "fim",
    "criado_em",
];

pub fn people_csv(people: &[Person]) -> Result<String, ServiceError> {
    render(
        PEOPLE_HEADER,
        people.iter().map(|p| {
            [
                p.id.to_string(),
                p.name.clone(),
                opt(&p.email),
                opt(&p.phone),
                opt(&p.neighborhood),
                opt(&p.city),
                opt(&p.notes),
                timestamp(Some(p.created_at)),
            ]
        }),
    )
}

pub fn interactions_csv(interactions: &[Interaction]) -> Result<String, ServiceError> {
    render(
        INTERACTIONS_HEADER,
        interactions.iter().map(|i| {
            [
                i.id.to_string(),
                i.person_id.to_string(),
                i.subject.clone(),
                i.kind.as_str().to_string(),
                i.status.as_str().to_string(),
                opt(&i.description),
                timestamp(i.scheduled_start),
                timestamp(i.scheduled_end),
                timestamp(Some(i.created_at)),
            ]
        }),
    )
}

/// Fields are quoted only when needed, rows end in CRLF.
fn render<const N: usize>(
    header: [&str; N],
    rows: impl Iterator<Item = [String; N]>,
) -> Result<String, ServiceError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .map_err(|e| anyhow::anyhow!("Failed to write CSV header: {}", e))?;
    for row in rows {
        writer
            .write_record(row.iter().map(|field| neutralize(field)))
            .map_err(|e| anyhow::anyhow!("Failed to write CSV row: {}", e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Internal(e.into()))
}

/// Fields a spreadsheet would evaluate as a formula get a leading apostrophe.
fn neutralize(field: &str) -> String {
    if field.starts_with(['=', '+', '-', '@']) {
        format!("'{field}")
    } else {
        field.to_string()
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map(|t| t.to_rfc3339()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn person_named(name: &str) -> Person {
        Person::new(name.to_string(), Uuid::new_v4())
    }

    #[test]
    fn test_neutralize() {
        assert_eq!(neutralize("simples"), "simples");
        assert_eq!(neutralize("=HYPERLINK(1)"), "'=HYPERLINK(1)");
        assert_eq!(neutralize("+55 81"), "'+55 81");
        assert_eq!(neutralize("@soma"), "'@soma");
    }

    #[test]
    fn test_people_csv_layout() {
        let mut person = person_named("Silva, Maria");
        person.city = Some("Olinda".to_string());

        let csv = people_csv(&[person.clone()]).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[0], "id,nome,email,telefone,bairro,cidade,observacoes,criado_em");
        assert!(lines[1].starts_with(&format!("{},\"Silva, Maria\",,,,Olinda,,", person.id)));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_quotes_and_line_breaks_are_escaped() {
        let mut person = person_named("diz \"oi\"");
        person.notes = Some("linha\nnova".to_string());

        let csv = people_csv(&[person]).unwrap();

        assert!(csv.contains(",\"diz \"\"oi\"\"\","));
        assert!(csv.contains(",\"linha\nnova\","));
    }

    #[test]
    fn test_formula_is_neutralized_before_quoting() {
        let person = person_named("=1+1,2");
        let csv = people_csv(&[person]).unwrap();
        assert!(csv.contains(",\"'=1+1,2\","));
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = interactions_csv(&[]).unwrap();
        assert_eq!(csv, "id,pessoa_id,assunto,tipo,status,descricao,inicio,fim,criado_em\r\n");
    }
}
