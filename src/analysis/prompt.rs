use super::types::MedicationEntry;
use super::AnalysisError;
use crate::models::{PromptLanguage, Severity};

/// Severity definitions given to the model. Reproduced verbatim in every prompt.
pub const SEVERITY_DEFINITIONS_CS: [(Severity, &str); 4] = [
    (
        Severity::Low,
        "Mírné interakce, které nejsou nebezpečné, ale je dobré o nich vědět. Můžete počkat na další návštěvu lékaře.",
    ),
    (
        Severity::Medium,
        "Důležité interakce, které mohou ovlivnit účinnost léků nebo způsobit nepříjemné vedlejší účinky. Promluvte s lékařem do týdne.",
    ),
    (
        Severity::High,
        "Nebezpečné interakce, které mohou způsobit vážné zdravotní problémy. Kontaktujte lékaře do 24-48 hodin.",
    ),
    (
        Severity::Critical,
        "Život ohrožující interakce, které mohou způsobit těžké otravy, krvácení, nebo srdeční problémy. Okamžitě volejte záchranku (155) nebo jděte na pohotovost.",
    ),
];

pub const SEVERITY_DEFINITIONS_EN: [(Severity, &str); 4] = [
    (
        Severity::Low,
        "Mild interactions that are not dangerous but are good to know about. No action is needed before your next routine doctor's visit.",
    ),
    (
        Severity::Medium,
        "Important interactions that can change how well the medications work or cause unpleasant side effects. Talk to your doctor within a week.",
    ),
    (
        Severity::High,
        "Dangerous interactions that can cause serious health problems. Contact your doctor within 24-48 hours.",
    ),
    (
        Severity::Critical,
        "Life-threatening interactions that can cause severe poisoning, bleeding or heart problems. Seek emergency care immediately: call the emergency number or go to the emergency room.",
    ),
];

/// Severity definitions for `language`, in ascending urgency.
pub fn severity_definitions(language: PromptLanguage) -> &'static [(Severity, &'static str); 4] {
    match language {
        PromptLanguage::Czech => &SEVERITY_DEFINITIONS_CS,
        PromptLanguage::English => &SEVERITY_DEFINITIONS_EN,
    }
}

/// Render one `- name (dosage, frequency)` line per medication, in input order.
pub fn format_medication_list(medications: &[MedicationEntry]) -> String {
    medications
        .iter()
        .map(|m| format!("- {} ({}, {})", m.name, m.dosage, m.frequency))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_severity_definitions(language: PromptLanguage) -> String {
    severity_definitions(language)
        .iter()
        .map(|(severity, definition)| format!("   - {} = {definition}", severity.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the interaction-analysis prompt for a medication list.
///
/// Fails with `EmptyInput` for an empty list; nothing else can fail.
pub fn build_interaction_prompt(
    medications: &[MedicationEntry],
    language: PromptLanguage,
) -> Result<String, AnalysisError> {
    if medications.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let list = format_medication_list(medications);
    let severity = format_severity_definitions(language);

    Ok(match language {
        PromptLanguage::Czech => czech_prompt(&list, &severity),
        PromptLanguage::English => english_prompt(&list, &severity),
    })
}

fn czech_prompt(medications: &str, severity_definitions: &str) -> String {
    format!(
        r#"KROK 1 - IDENTIFIKACE LÉKŮ:
Nejdříve zkontroluj, zda znáš všechny uvedené léky/látky:
{medications}

Pro každý lék:
- Pokud si NEJSI JISTÝ jeho identifikací nebo účinnou látkou, označ ho jako "neznámý"
- Analyzuj POUZE léky, které jednoznačně znáš

KROK 2 - ANALÝZA INTERAKCÍ:
Analyzuj možné interakce pouze u léků, které jsi správně identifikoval.

DŮLEŽITÉ: Piš jako by ses bavil s běžným člověkem, ne s lékařem. Vysvětluj jednoduše, co to znamená v praxi.

Poskytni odpověď v následujícím JSON formátu:
{{
  "unknownMedications": [
    {{
      "name": "název léku",
      "note": "Neznámý přípravek - ověřte název a účinnou látku s lékárníkem před analýzou interakcí"
    }}
  ],
  "interactions": [
    {{
      "severity": "low|medium|high|critical",
      "description": "Jasné vysvětlení co se může stát, proč je to problém a jak se to projevuje v běžném životě",
      "medications": ["Lék 1", "Lék 2"],
      "whatToDo": "Konkrétní kroky co má člověk udělat"
    }}
  ],
  "recommendations": [
    "Praktické rady co dělat - bez odborných termínů"
  ],
  "questionsForDoctor": [
    "Konkrétní otázky které si může pacient připravit"
  ],
  "warnings": [
    "Kompletní věty o tom, kdy okamžitě volat lékaře - začínej 'Okamžitě volejte lékaře pokud' nebo 'Jděte na pohotovost pokud'"
  ]
}}

PRAVIDLA PRO ODPOVĚĎ:
1. NIKDY neanalyzuj interakce léků, které neznáš - radši je označ jako neznámé
2. ŽÁDNÉ odborné termíny bez vysvětlení (ne "hyperkalemie", ale "příliš draslíku v krvi")
3. VŽDY vysvětli co to znamená pro běžný den člověka
4. KONKRÉTNÍ příznaky - ne "nevolnost", ale "pocit na zvracení, slabost"
5. PRAKTICKÉ rady - "užívejte ráno" místo "na lačný žaludek"
6. WARNINGS musí být kompletní věty s jasnou instrukcí kdy volat pomoc
7. Severity - PŘESNÉ DEFINICE:
{severity_definitions}

PŘÍKLADY NEZNÁMÝCH LÉKŮ:
- Lokální názvy přípravků (Bitinex, Leram, apod.)
- Neobvyklé názvy bez jasné účinné látky
- Přípravky, u kterých si nejsi jistý složením

PŘÍKLADY ZNÁMÝCH LÉKŮ:
- Mezinárodní názvy (Sertralin, Warfarin, Ibuprofen)
- Jasně identifikovatelné účinné látky

Příklad dobré odpovědi:
"Tyto dva léky společně mohou způsobit, že se vám bude více točit hlava a budete se cítit slabí. Může se stát, že při vstávání z postele nebo ze židle se budete cítit nejistě. To je nebezpečné kvůli pádu."

PŘÍKLADY SEVERITY LEVELS:
- LOW: "Omeprazol může mírně snížit účinnost jiného léku - není to nebezpečné"
- MEDIUM: "Kombinace může způsobit silnější únavu a závrať - sledujte příznaky"
- HIGH: "Riziko vážného krvácení - urgentně kontaktujte lékaře"
- CRITICAL: "Riziko serotoninového syndromu - okamžitá lékařská pomoc při horečce, třesu, zmatenosti"

PŘÍKLADY SPRÁVNÝCH WARNINGS:
- "Okamžitě volejte lékaře pokud máte silné svalové křeče a cítíte se velmi slabí"
- "Jděte na pohotovost pokud se vám začne nepravidelně bít srdce nebo máte problémy s dýcháním"
- "Volejte 155 pokud krvácíte a krvácení se nezastaví do 10 minut"

ODPOVĚĎ MUSÍ BÝT POUZE JSON BEZ ŽÁDNÝCH MARKDOWN BLOKŮ NEBO DODATEČNÉHO TEXTU."#
    )
}

fn english_prompt(medications: &str, severity_definitions: &str) -> String {
    format!(
        r#"STEP 1 - IDENTIFY THE MEDICATIONS:
First check whether you know every medication/substance listed:
{medications}

For each medication:
- If you are NOT SURE what it is or what its active ingredient is, mark it as "unknown"
- Analyze ONLY medications you can identify with confidence
- NEVER analyze interactions for a medication you marked as unknown

STEP 2 - ANALYZE INTERACTIONS:
Analyze possible interactions only between the medications you identified with confidence.

IMPORTANT: Write as if you were talking to an ordinary person, not to a doctor. Explain simply what it means in everyday life. Name concrete symptoms and concrete actions, and never use a medical term without explaining it.

Reply in the following JSON format:
{{
  "unknownMedications": [
    {{
      "name": "medication name",
      "note": "Unknown product - check the name and active ingredient with a pharmacist before interactions are analyzed"
    }}
  ],
  "interactions": [
    {{
      "severity": "low|medium|high|critical",
      "description": "Clear explanation of what can happen, why it is a problem and how it shows up in everyday life",
      "medications": ["Medication 1", "Medication 2"],
      "whatToDo": "Concrete steps the person should take"
    }}
  ],
  "recommendations": [
    "Practical advice on what to do - no medical jargon"
  ],
  "questionsForDoctor": [
    "Concrete questions the patient can prepare for the doctor"
  ],
  "warnings": [
    "Complete sentences about when to call a doctor right away - start with 'Call your doctor immediately if' or 'Go to the emergency room if'"
  ]
}}

RULES FOR THE REPLY:
1. NEVER analyze interactions of medications you do not know - mark them as unknown instead
2. NO medical terms without an explanation (not "hyperkalemia" but "too much potassium in the blood")
3. ALWAYS explain what it means for the person's ordinary day
4. CONCRETE symptoms - not "nausea" but "feeling like throwing up, weakness"
5. PRACTICAL advice - "take it in the morning" instead of "take on an empty stomach"
6. WARNINGS must be complete sentences with a clear instruction on when to get help
7. Severity - EXACT DEFINITIONS:
{severity_definitions}

EXAMPLES OF UNKNOWN MEDICATIONS:
- Local product names (Bitinex, Leram, etc.)
- Unusual names without a clear active ingredient
- Products whose composition you are not sure about

EXAMPLES OF KNOWN MEDICATIONS:
- International names (Sertraline, Warfarin, Ibuprofen)
- Clearly identifiable active ingredients

Example of a good answer:
"Together these two medications can make you feel dizzier and weaker. You may feel unsteady when you get up from bed or from a chair. That is dangerous because you could fall."

Example of a bad answer:
"Concomitant use potentiates CNS depression and orthostatic hypotension."

SEVERITY LEVEL EXAMPLES:
- LOW: "Omeprazole can slightly reduce how well another medication works - it is not dangerous"
- MEDIUM: "The combination can make you more tired and dizzy - watch for these symptoms"
- HIGH: "Risk of serious bleeding - contact your doctor urgently"
- CRITICAL: "Risk of serotonin syndrome - get medical help immediately if you have a fever, shaking or confusion"

EXAMPLES OF CORRECT WARNINGS:
- "Call your doctor immediately if you have strong muscle cramps and feel very weak"
- "Go to the emergency room if your heart starts beating irregularly or you have trouble breathing"
- "Call the emergency number if you are bleeding and the bleeding does not stop within 10 minutes"

THE REPLY MUST BE JSON ONLY, WITHOUT ANY MARKDOWN CODE BLOCKS OR ADDITIONAL TEXT."#
    )
}
