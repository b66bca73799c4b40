//! Worked examples spliced into the generator prompt.
//!
//! Examples are keyed by subject and school band. When a subject has no
//! examples for the requested band, the first band it does have is used.

use serde_json::{json, Value};

use quizalign_core::band::Band;

fn examples_for(subject: &str, band: Band) -> Option<Value> {
    let examples = match (subject, band) {
        ("matematica", Band::Middle) => json!([
            {
                "type": "MCQ",
                "prompt": "Risolvi l'equazione di primo grado: 2x + 5 = 13",
                "options": ["x = 2", "x = 4", "x = 6", "x = 8"],
                "correctAnswer": {"selected": 1},
                "points": 2,
                "explainForTeacher": "Equazione lineare semplice per 2ª media"
            },
            {
                "type": "TF",
                "prompt": "In una frazione, se moltiplico numeratore e denominatore per lo stesso numero, ottengo una frazione equivalente",
                "correctAnswer": {"value": true},
                "points": 1,
                "explainForTeacher": "Proprietà fondamentale delle frazioni equivalenti"
            },
            {
                "type": "SHORT",
                "prompt": "Calcola l'area di un triangolo con base 8 cm e altezza 5 cm",
                "correctAnswer": {"expected": "20 cm²"},
                "points": 2,
                "explainForTeacher": "Formula area triangolo: (b × h) / 2"
            }
        ]),
        ("storia", Band::Middle) => json!([
            {
                "type": "MCQ",
                "prompt": "Chi fu il primo imperatore di Roma antica?",
                "options": ["Giulio Cesare", "Ottaviano Augusto", "Marco Antonio", "Nerone"],
                "correctAnswer": {"selected": 1},
                "points": 1,
                "explainForTeacher": "Passaggio da Repubblica a Impero romano"
            },
            {
                "type": "TF",
                "prompt": "Le invasioni barbariche contribuirono alla caduta dell'Impero Romano d'Occidente",
                "correctAnswer": {"value": true},
                "points": 1
            },
            {
                "type": "SHORT",
                "prompt": "Descrivi brevemente il sistema feudale del Medioevo",
                "correctAnswer": {"expected": "Terre concesse in cambio di servizio militare e fedeltà"},
                "points": 3
            }
        ]),
        ("scienze", Band::Primary) => json!([
            {
                "type": "MCQ",
                "prompt": "Durante la fotosintesi, le piante producono:",
                "options": ["Anidride carbonica", "Ossigeno", "Azoto", "Vapore acqueo"],
                "correctAnswer": {"selected": 1},
                "points": 1
            },
            {
                "type": "TF",
                "prompt": "Gli stomi sono piccole aperture sulle foglie",
                "correctAnswer": {"value": true},
                "points": 1
            },
            {
                "type": "SHORT",
                "prompt": "Cosa serve alle piante per fare la fotosintesi?",
                "correctAnswer": {"expected": "Luce solare, anidride carbonica e acqua"},
                "points": 2
            }
        ]),
        ("italiano", Band::Secondary) => json!([
            {
                "type": "MCQ",
                "prompt": "Nell'analisi del periodo, una proposizione subordinata dipende da:",
                "options": ["Un'altra subordinata", "La proposizione principale", "Un complemento", "Un attributo"],
                "correctAnswer": {"selected": 1},
                "points": 2
            },
            {
                "type": "TF",
                "prompt": "La metafora è una figura retorica che stabilisce un paragone diretto tra due elementi",
                "correctAnswer": {"value": false},
                "points": 1,
                "explainForTeacher": "Differenza tra metafora e similitudine"
            },
            {
                "type": "SHORT",
                "prompt": "Identifica il tema principale del canto III dell'Inferno di Dante",
                "correctAnswer": {"expected": "Gli ignavi, anime che non scelsero mai nella vita"},
                "points": 3
            }
        ]),
        ("inglese", Band::Middle) => json!([
            {
                "type": "MCQ",
                "prompt": "Which is the correct form of Simple Past for the verb 'go'?",
                "options": ["goed", "went", "gone", "going"],
                "correctAnswer": {"selected": 1},
                "points": 1
            },
            {
                "type": "TF",
                "prompt": "We use 'did' to make questions in Simple Past with irregular verbs",
                "correctAnswer": {"value": true},
                "points": 1
            },
            {
                "type": "SHORT",
                "prompt": "Complete: Yesterday I _____ to school by bus (use 'go' in Simple Past)",
                "correctAnswer": {"expected": "went"},
                "points": 2
            }
        ]),
        _ => return None,
    };
    Some(examples)
}

/// Examples for a subject, preferring the requested band.
///
/// Returns an empty list for subjects without examples.
pub fn few_shot_examples(subject: &str, band: Band) -> Vec<Value> {
    let subject = subject.trim().to_lowercase();
    [band, Band::Primary, Band::Middle, Band::Secondary]
        .into_iter()
        .find_map(|b| examples_for(&subject, b))
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}
