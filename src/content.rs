//! Fixed reference content for the veterinary emergency and knowledge pages.

use serde::Serialize;

pub const EMERGENCY_PHONE: &str = "+91-9876543210";
pub const WHATSAPP_LINK: &str = "https://wa.me/919876543210?text=Emergency%20Vet%20Help%20Needed";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Sign {
    pub title: &'static str,
    pub detail: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub items: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct EmergencyGuide {
    pub helpline: &'static str,
    pub dial_link: &'static str,
    pub whatsapp_link: &'static str,
    pub emergency_signs: &'static [Sign],
    pub first_aid: &'static [&'static str],
}

pub const EMERGENCY: EmergencyGuide = EmergencyGuide {
    helpline: EMERGENCY_PHONE,
    dial_link: "tel:+91-9876543210",
    whatsapp_link: WHATSAPP_LINK,
    emergency_signs: &[
        Sign { title: "Severe bleeding", detail: "Wounds that won't stop bleeding" },
        Sign { title: "Difficulty breathing", detail: "Labored or rapid breathing" },
        Sign { title: "Severe diarrhea or vomiting", detail: "Continuous for more than 24 hours" },
        Sign { title: "Inability to stand", detail: "Sudden weakness or collapse" },
        Sign { title: "Eye injuries", detail: "Any trauma to the eyes" },
        Sign { title: "Birthing complications", detail: "Prolonged labor or visible distress" },
        Sign { title: "Poisoning symptoms", detail: "Excessive drooling, tremors, seizures" },
        Sign { title: "High fever", detail: "Body temperature above 103°F (39.4°C)" },
    ],
    first_aid: &[
        "Keep the animal calm and in a safe, quiet area",
        "For bleeding: Apply gentle pressure with clean cloth",
        "For poisoning: Do NOT induce vomiting - call vet immediately",
        "Keep the animal's airway clear",
        "Monitor breathing and heart rate",
        "Note symptoms and time of onset to inform the vet",
    ],
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct KnowledgeBase {
    pub vaccination_schedule: &'static [Section],
    pub common_diseases: &'static [Section],
    pub feeding_guide: &'static [Section],
    pub call_a_vet_when: &'static [Sign],
}

pub const KNOWLEDGE: KnowledgeBase = KnowledgeBase {
    vaccination_schedule: &[
        Section {
            title: "Initial Vaccinations (Calves)",
            items: &[
                "1-2 months: FMD (Foot and Mouth Disease) - 1st dose",
                "3-4 months: FMD - 2nd dose",
                "4-6 months: Brucellosis (female calves only)",
                "6 months: Black Quarter (BQ) - 1st dose",
            ],
        },
        Section {
            title: "Annual Vaccinations (Adult Cattle)",
            items: &[
                "Every 6 months: FMD booster",
                "Annually: Hemorrhagic Septicemia (HS)",
                "Annually: Black Quarter (BQ) booster",
                "Pre-monsoon: Anthrax vaccination",
            ],
        },
    ],
    common_diseases: &[
        Section {
            title: "Foot and Mouth Disease (FMD)",
            items: &[
                "High fever (104-106°F)",
                "Blisters on mouth, tongue, and hooves",
                "Excessive salivation",
                "Lameness and reluctance to move",
                "Reduced milk production",
            ],
        },
        Section {
            title: "Mastitis",
            items: &[
                "Swollen, hot, or hard udder",
                "Abnormal milk (clots, blood, watery)",
                "Reduced milk yield",
                "Fever and loss of appetite",
                "Pain when touching udder",
            ],
        },
        Section {
            title: "Digestive Issues",
            items: &[
                "Bloating or distended abdomen",
                "Diarrhea or constipation",
                "Loss of appetite",
                "Reduced rumination",
                "Dehydration",
            ],
        },
        Section {
            title: "Respiratory Problems",
            items: &[
                "Coughing or difficulty breathing",
                "Nasal discharge",
                "Fever",
                "Reduced activity and appetite",
                "Rapid breathing",
            ],
        },
    ],
    feeding_guide: &[
        Section {
            title: "Daily Feed Requirements (per 100 kg body weight)",
            items: &[
                "Green Fodder: 15-20 kg (Berseem, Maize, Jowar)",
                "Dry Fodder: 3-4 kg (Wheat/Rice straw)",
                "Concentrate Mix: 1-2 kg (based on milk production)",
                "Water: 30-40 liters (clean, fresh water)",
            ],
        },
        Section {
            title: "Concentrate Mix Composition",
            items: &[
                "Maize/Wheat: 30-35%",
                "De-oiled Rice Bran: 20-25%",
                "Cottonseed/Groundnut Cake: 20-25%",
                "Wheat Bran: 10-15%",
                "Mineral Mixture: 2%",
                "Salt: 1%",
            ],
        },
        Section {
            title: "Feeding Tips",
            items: &[
                "Feed at regular times (morning and evening)",
                "Increase concentrate for high-yielding cows",
                "Ensure clean, mold-free fodder",
                "Provide minerals and vitamin supplements",
                "Adjust feed during pregnancy and lactation",
            ],
        },
    ],
    call_a_vet_when: &[
        Sign { title: "Sudden drop in milk production", detail: "more than 20%" },
        Sign { title: "High fever", detail: "above 103°F / 39.4°C" },
        Sign { title: "Persistent diarrhea or constipation", detail: "more than 24 hours" },
        Sign { title: "Breathing difficulties", detail: "or rapid breathing" },
        Sign { title: "Severe bloating", detail: "or distended abdomen" },
        Sign { title: "Wounds or injuries", detail: "that need treatment" },
        Sign { title: "Birthing complications", detail: "or retained placenta" },
        Sign { title: "Abnormal discharge", detail: "from any body opening" },
        Sign { title: "Sudden behavioral changes", detail: "or lethargy" },
        Sign { title: "Visible pain or discomfort", detail: "" },
    ],
};
