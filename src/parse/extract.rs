use crate::model::Record;
use crate::parse::segment::RecordBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    VoterNumber,
    FatherName,
    MotherName,
    Address,
    Occupation,
}

/// The fixed record grammar: label prefixes matched at line start, in order.
/// Adding a field is a table entry, not a new branch.
const FIELD_LABELS: &[(&str, Field)] = &[
    ("ভোটার নং", Field::VoterNumber),
    ("পিতা", Field::FatherName),
    ("মাতা", Field::MotherName),
    ("ঠিকানা", Field::Address),
    ("পেশা", Field::Occupation),
];

/// The occupation line embeds the birth date behind this literal label
/// rather than on a line of its own.
const BIRTH_DATE_LABEL: &str = "জন্ম তারিখ:";

/// Builds one Record from a block. Lines matching no known label are OCR
/// noise or continuation text and are skipped. Only the first colon separates
/// label from value, so colons inside the value survive verbatim.
pub fn extract_record(block: &RecordBlock) -> Record {
    let mut record = Record {
        serial: block.serial,
        name: block.name.clone(),
        ..Record::default()
    };

    for line in &block.lines {
        for (label, field) in FIELD_LABELS {
            let Some(value) = labeled_value(line, label) else {
                continue;
            };

            match field {
                Field::VoterNumber => record.voter_number = value.trim().to_string(),
                Field::FatherName => record.father_name = value.trim().to_string(),
                Field::MotherName => record.mother_name = value.trim().to_string(),
                Field::Address => record.address = value.trim().to_string(),
                Field::Occupation => {
                    let (occupation, birth_date) = split_occupation(value);
                    record.occupation = occupation;
                    record.birth_date = birth_date;
                }
            }

            break;
        }
    }

    record
}

fn labeled_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.strip_prefix(label)?.strip_prefix(':')
}

fn split_occupation(value: &str) -> (String, String) {
    match value.split_once(BIRTH_DATE_LABEL) {
        Some((before, after)) => {
            let occupation = before.trim_end();
            let occupation = occupation.strip_suffix(',').unwrap_or(occupation);

            (occupation.trim().to_string(), after.trim().to_string())
        }
        None => (value.trim().to_string(), String::new()),
    }
}
