//! The constant lineage dataset and the decorative annotation lists.

/// One entry of the lineage table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub name: String,
    pub parent: Option<String>,
    pub year: i32,
    pub color: String,
    pub importance: u8,
    pub branch_type: String,
    pub extinct: bool,
}

impl ModelRecord {
    pub fn new(
        name: impl Into<String>,
        parent: Option<&str>,
        year: i32,
        color: impl Into<String>,
        importance: u8,
        branch_type: impl Into<String>,
        extinct: bool,
    ) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_owned),
            year,
            color: color.into(),
            importance,
            branch_type: branch_type.into(),
            extinct,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A period drawn as a translucent band between two year rings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtinctionEvent {
    pub label: String,
    pub start_year: i32,
    pub end_year: i32,
}

/// A node singled out with a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakthrough {
    pub node_name: String,
    pub year: i32,
    pub marker: BreakthroughMarker,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BreakthroughMarker {
    Star,
    Burst,
}

/// Everything a render pass reads: the records and the overlays.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub models: Vec<ModelRecord>,
    pub extinction_events: Vec<ExtinctionEvent>,
    pub breakthroughs: Vec<Breakthrough>,
}

impl Dataset {
    /// The built-in AI lineage table.
    pub fn builtin() -> Self {
        Self {
            models: ai_models(),
            extinction_events: extinction_events(),
            breakthroughs: breakthroughs(),
        }
    }
}

type RawRecord = (
    &'static str,
    Option<&'static str>,
    i32,
    &'static str,
    u8,
    &'static str,
    bool,
);

// (name, parent, year, color, importance, branch_type, extinct)
const AI_MODELS: &[RawRecord] = &[
    ("Perceptron", None, 1958, "#2F4F4F", 5, "root", false),
    ("Symbolic AI", Some("Perceptron"), 1960, "#8B7355", 3, "symbolic", true),
    ("ELIZA", Some("Symbolic AI"), 1966, "#8B7355", 2, "symbolic", true),
    ("Expert Systems", Some("Symbolic AI"), 1975, "#8B7355", 2, "symbolic", true),
    ("Backpropagation", Some("Perceptron"), 1986, "#FF6347", 5, "innovation", false),
    ("Neocognitron", Some("Perceptron"), 1980, "#DDA0DD", 2, "cnn", true),
    ("CNNs", Some("Backpropagation"), 1989, "#9370DB", 4, "cnn", false),
    ("LeNet-1", Some("CNNs"), 1989, "#9370DB", 2, "cnn", false),
    ("LeNet-5", Some("LeNet-1"), 1998, "#9370DB", 3, "cnn", false),
    ("AlexNet", Some("LeNet-5"), 2012, "#9370DB", 5, "cnn", false),
    ("VGGNet", Some("AlexNet"), 2014, "#9370DB", 3, "cnn", false),
    ("GoogLeNet", Some("AlexNet"), 2014, "#9370DB", 3, "cnn", false),
    ("ResNet", Some("AlexNet"), 2015, "#9370DB", 5, "cnn", false),
    ("EfficientNet", Some("ResNet"), 2019, "#9370DB", 3, "cnn", false),
    ("RNNs", Some("Backpropagation"), 1990, "#4169E1", 3, "rnn", true),
    ("LSTM", Some("RNNs"), 1997, "#4169E1", 4, "rnn", true),
    ("GRU", Some("LSTM"), 2014, "#4169E1", 2, "rnn", true),
    ("Seq2Seq", Some("LSTM"), 2014, "#4169E1", 3, "rnn", true),
    ("Word2Vec", Some("RNNs"), 2013, "#87CEEB", 3, "embedding", false),
    ("GloVe", Some("Word2Vec"), 2014, "#87CEEB", 2, "embedding", false),
    ("GANs", Some("Backpropagation"), 2014, "#FFA500", 4, "gan", true),
    ("Progressive GAN", Some("GANs"), 2017, "#FFA500", 2, "gan", true),
    ("StyleGAN", Some("Progressive GAN"), 2018, "#FFA500", 3, "gan", true),
    ("StyleGAN2", Some("StyleGAN"), 2019, "#FFA500", 3, "gan", true),
    ("BigGAN", Some("GANs"), 2018, "#FFA500", 2, "gan", true),
    ("Q-Learning", Some("Perceptron"), 1989, "#228B22", 3, "rl", false),
    ("DQN", Some("Q-Learning"), 2013, "#228B22", 3, "rl", false),
    ("AlphaGo", Some("DQN"), 2016, "#228B22", 5, "rl", false),
    ("AlphaGo Zero", Some("AlphaGo"), 2017, "#228B22", 4, "rl", false),
    ("PPO", Some("DQN"), 2017, "#228B22", 3, "rl", false),
    ("RLHF", Some("PPO"), 2020, "#228B22", 4, "rl", false),
    ("Transformers", Some("Backpropagation"), 2017, "#00CED1", 5, "transformer", false),
    ("BERT", Some("Transformers"), 2018, "#8B008B", 5, "encoder", false),
    ("RoBERTa", Some("BERT"), 2019, "#8B008B", 3, "encoder", false),
    ("ALBERT", Some("BERT"), 2019, "#8B008B", 2, "encoder", false),
    ("DistilBERT", Some("BERT"), 2019, "#8B008B", 2, "encoder", false),
    ("ELECTRA", Some("BERT"), 2020, "#8B008B", 2, "encoder", false),
    ("ModernBERT", Some("BERT"), 2024, "#8B008B", 2, "encoder", false),
    ("GPT", Some("Transformers"), 2018, "#00BFFF", 4, "decoder", false),
    ("GPT-2", Some("GPT"), 2019, "#00BFFF", 4, "decoder", false),
    ("GPT-3", Some("GPT-2"), 2020, "#00BFFF", 5, "decoder", false),
    ("GPT-3.5", Some("GPT-3"), 2022, "#00BFFF", 4, "decoder", false),
    ("ChatGPT", Some("GPT-3.5"), 2022, "#00BFFF", 5, "decoder", false),
    ("GPT-4", Some("ChatGPT"), 2023, "#00BFFF", 5, "decoder", false),
    ("GPT-4 Turbo", Some("GPT-4"), 2023, "#00BFFF", 3, "decoder", false),
    ("GPT-4o", Some("GPT-4 Turbo"), 2024, "#00BFFF", 4, "decoder", false),
    ("o1", Some("GPT-4o"), 2024, "#00BFFF", 5, "decoder", false),
    ("Claude", Some("Transformers"), 2023, "#7B68EE", 4, "claude", false),
    ("Claude 2", Some("Claude"), 2023, "#7B68EE", 3, "claude", false),
    ("Claude 3 Haiku", Some("Claude 2"), 2024, "#7B68EE", 3, "claude", false),
    ("Claude 3 Sonnet", Some("Claude 2"), 2024, "#7B68EE", 4, "claude", false),
    ("Claude 3 Opus", Some("Claude 2"), 2024, "#7B68EE", 4, "claude", false),
    ("Claude 3.5 Sonnet", Some("Claude 3 Sonnet"), 2024, "#7B68EE", 5, "claude", false),
    ("Claude 4 Sonnet", Some("Claude 3.5 Sonnet"), 2025, "#7B68EE", 5, "claude", false),
    ("PaLM", Some("Transformers"), 2022, "#008B8B", 4, "google", false),
    ("PaLM 2", Some("PaLM"), 2023, "#008B8B", 4, "google", false),
    ("Gemini 1.0", Some("PaLM 2"), 2023, "#008B8B", 4, "google", false),
    ("Gemini 1.5", Some("Gemini 1.0"), 2024, "#008B8B", 4, "google", false),
    ("Gemini 2.0", Some("Gemini 1.5"), 2024, "#008B8B", 4, "google", false),
    ("Gemini 2.5", Some("Gemini 2.0"), 2025, "#008B8B", 4, "google", false),
    ("Gemma", Some("PaLM"), 2024, "#20B2AA", 3, "google", false),
    ("Gemma 2", Some("Gemma"), 2024, "#20B2AA", 3, "google", false),
    ("LLaMA", Some("Transformers"), 2023, "#FF4500", 5, "llama", false),
    ("LLaMA 2", Some("LLaMA"), 2023, "#FF4500", 4, "llama", false),
    ("LLaMA 3", Some("LLaMA 2"), 2024, "#FF4500", 5, "llama", false),
    ("LLaMA 3.1", Some("LLaMA 3"), 2024, "#FF4500", 4, "llama", false),
    ("LLaMA 3.2", Some("LLaMA 3.1"), 2024, "#FF4500", 3, "llama", false),
    ("LLaMA 4", Some("LLaMA 3.2"), 2025, "#FF4500", 4, "llama", false),
    ("Code Llama", Some("LLaMA"), 2023, "#FF6347", 3, "llama", false),
    ("Phi-1", Some("Transformers"), 2023, "#C0C0C0", 2, "microsoft", false),
    ("Phi-2", Some("Phi-1"), 2023, "#C0C0C0", 3, "microsoft", false),
    ("Phi-3", Some("Phi-2"), 2024, "#C0C0C0", 3, "microsoft", false),
    ("Phi-4", Some("Phi-3"), 2025, "#C0C0C0", 3, "microsoft", false),
    ("Command", Some("Transformers"), 2023, "#CD7F32", 3, "cohere", false),
    ("Command R", Some("Command"), 2024, "#CD7F32", 3, "cohere", false),
    ("Command R+", Some("Command R"), 2024, "#CD7F32", 3, "cohere", false),
    ("T5", Some("Transformers"), 2019, "#9ACD32", 4, "enc-dec", false),
    ("BART", Some("Transformers"), 2019, "#9ACD32", 3, "enc-dec", false),
    ("FLAN-T5", Some("T5"), 2022, "#9ACD32", 3, "enc-dec", false),
    ("CLIP", Some("Transformers"), 2021, "#DA70D6", 4, "multimodal", false),
    ("DALL-E", Some("CLIP"), 2021, "#DA70D6", 4, "multimodal", false),
    ("Flamingo", Some("CLIP"), 2022, "#DA70D6", 3, "multimodal", false),
    ("GPT-4V", Some("GPT-4"), 2023, "#DA70D6", 4, "multimodal", false),
    ("ViT", Some("Transformers"), 2020, "#BA55D3", 4, "vit", false),
    ("DeiT", Some("ViT"), 2020, "#BA55D3", 2, "vit", false),
    ("Swin Transformer", Some("ViT"), 2021, "#BA55D3", 3, "vit", false),
    ("BEiT", Some("ViT"), 2021, "#BA55D3", 2, "vit", false),
    ("DDPM", Some("Backpropagation"), 2020, "#FF1493", 4, "diffusion", false),
    ("DALL-E 2", Some("DDPM"), 2022, "#FF1493", 5, "diffusion", false),
    ("Stable Diffusion", Some("DDPM"), 2022, "#FF1493", 5, "diffusion", false),
    ("SD 2.x", Some("Stable Diffusion"), 2022, "#FF1493", 3, "diffusion", false),
    ("SDXL", Some("SD 2.x"), 2023, "#FF1493", 4, "diffusion", false),
    ("Midjourney", Some("DDPM"), 2022, "#FF69B4", 5, "diffusion", false),
    ("SD 3", Some("SDXL"), 2024, "#FF1493", 4, "diffusion", false),
    ("SD 3.5", Some("SD 3"), 2024, "#FF1493", 3, "diffusion", false),
    ("Imagen 3", Some("DDPM"), 2024, "#FF1493", 3, "diffusion", false),
    ("Qwen", Some("Transformers"), 2023, "#DC143C", 4, "chinese", false),
    ("Qwen-2", Some("Qwen"), 2024, "#DC143C", 4, "chinese", false),
    ("Qwen-2.5", Some("Qwen-2"), 2024, "#DC143C", 4, "chinese", false),
    ("Qwen-2.5-Max", Some("Qwen-2.5"), 2025, "#DC143C", 4, "chinese", false),
    ("ERNIE", Some("Transformers"), 2019, "#FFD700", 3, "chinese", false),
    ("ERNIE 3.0", Some("ERNIE"), 2021, "#FFD700", 3, "chinese", false),
    ("ERNIE Bot", Some("ERNIE 3.0"), 2023, "#FFD700", 3, "chinese", false),
    ("ERNIE 4.0", Some("ERNIE Bot"), 2023, "#FFD700", 3, "chinese", false),
    ("Doubao", Some("Transformers"), 2024, "#FF8C00", 3, "chinese", false),
    ("Doubao-1.5-Pro", Some("Doubao"), 2025, "#FF8C00", 3, "chinese", false),
    ("ChatGLM", Some("Transformers"), 2023, "#B22222", 3, "chinese", false),
    ("GLM-4", Some("ChatGLM"), 2024, "#B22222", 3, "chinese", false),
    ("Yi", Some("Transformers"), 2023, "#8B0000", 3, "chinese", false),
    ("Yi-VL", Some("Yi"), 2024, "#8B0000", 3, "chinese", false),
    ("DeepSeek", Some("Transformers"), 2023, "#800000", 4, "chinese", false),
    ("DeepSeek-V2", Some("DeepSeek"), 2024, "#800000", 4, "chinese", false),
    ("DeepSeek-R1", Some("DeepSeek-V2"), 2025, "#800000", 5, "chinese", false),
    ("Kimi", Some("Transformers"), 2023, "#CD5C5C", 3, "chinese", false),
];

/// Branch type to legend color.
pub const COLOR_SCHEME: &[(&str, &str)] = &[
    ("root", "#2F4F4F"),
    ("symbolic", "#8B7355"),
    ("innovation", "#FF6347"),
    ("cnn", "#9370DB"),
    ("rnn", "#4169E1"),
    ("embedding", "#87CEEB"),
    ("gan", "#FFA500"),
    ("rl", "#228B22"),
    ("transformer", "#00CED1"),
    ("encoder", "#8B008B"),
    ("decoder", "#00BFFF"),
    ("claude", "#7B68EE"),
    ("google", "#008B8B"),
    ("llama", "#FF4500"),
    ("microsoft", "#C0C0C0"),
    ("cohere", "#CD7F32"),
    ("enc-dec", "#9ACD32"),
    ("multimodal", "#DA70D6"),
    ("vit", "#BA55D3"),
    ("diffusion", "#FF1493"),
    ("chinese", "#DC143C"),
];

/// Short legend shown on the rendered images.
pub const LEGEND_ITEMS: &[(&str, &str)] = &[
    ("#9370DB", "CNNs"),
    ("#00CED1", "Transformers"),
    ("#00BFFF", "GPT"),
    ("#7B68EE", "Claude"),
    ("#FF4500", "LLaMA"),
    ("#008B8B", "Gemini"),
    ("#FF1493", "Diffusion"),
    ("#DC143C", "Chinese AI"),
];

pub fn ai_models() -> Vec<ModelRecord> {
    AI_MODELS
        .iter()
        .map(|&(name, parent, year, color, importance, branch_type, extinct)| {
            ModelRecord::new(name, parent, year, color, importance, branch_type, extinct)
        })
        .collect()
}

pub fn extinction_events() -> Vec<ExtinctionEvent> {
    [
        ("AI Winter", 1974, 1980),
        ("RNN Decline", 2018, 2020),
        ("GAN Displacement", 2022, 2023),
    ]
    .into_iter()
    .map(|(label, start_year, end_year)| ExtinctionEvent {
        label: label.to_owned(),
        start_year,
        end_year,
    })
    .collect()
}

pub fn breakthroughs() -> Vec<Breakthrough> {
    use BreakthroughMarker::{Burst, Star};

    [
        ("Backpropagation", 1986, Star),
        ("AlexNet", 2012, Burst),
        ("ResNet", 2015, Star),
        ("Transformers", 2017, Burst),
        ("GPT-3", 2020, Star),
        ("ChatGPT", 2022, Burst),
        ("DeepSeek-R1", 2025, Burst),
    ]
    .into_iter()
    .map(|(node_name, year, marker)| Breakthrough {
        node_name: node_name.to_owned(),
        year,
        marker,
    })
    .collect()
}

pub fn scheme_color(branch_type: &str) -> Option<&'static str> {
    COLOR_SCHEME
        .iter()
        .find(|(kind, _)| *kind == branch_type)
        .map(|(_, color)| *color)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_table_holds_only_model_rows() {
        let models = ai_models();
        assert_eq!(models.len(), 114);
        assert_eq!(models.first().map(|m| m.name.as_str()), Some("Perceptron"));
        assert_eq!(models.last().map(|m| m.name.as_str()), Some("Kimi"));
        for event in extinction_events() {
            assert!(models.iter().all(|m| m.name != event.label));
        }
    }

    #[test]
    fn builtin_table_has_single_root() {
        let models = ai_models();
        let roots: Vec<_> = models.iter().filter(|m| m.is_root()).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Perceptron");
        assert_eq!(roots[0].year, 1958);
    }

    #[test]
    fn builtin_names_are_unique_and_parents_resolve() {
        let models = ai_models();
        let names: HashSet<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names.len(), models.len());

        for model in &models {
            if let Some(parent) = &model.parent {
                assert!(names.contains(parent.as_str()), "{} -> {}", model.name, parent);
            }
        }
    }

    #[test]
    fn builtin_values_are_in_range() {
        for model in ai_models() {
            assert!((1..=5).contains(&model.importance), "{}", model.name);
            assert!((1958..=2026).contains(&model.year), "{}", model.name);
            assert!(model.color.starts_with('#') && model.color.len() == 7);
        }
    }

    #[test]
    fn every_branch_type_has_a_scheme_color() {
        for model in ai_models() {
            assert!(
                scheme_color(&model.branch_type).is_some(),
                "missing scheme color for {}",
                model.branch_type
            );
        }
    }

    #[test]
    fn annotations_reference_known_models() {
        let dataset = Dataset::builtin();
        let names: HashSet<&str> = dataset.models.iter().map(|m| m.name.as_str()).collect();
        for breakthrough in &dataset.breakthroughs {
            assert!(names.contains(breakthrough.node_name.as_str()));
        }
        for event in &dataset.extinction_events {
            assert!(event.start_year < event.end_year);
        }
    }
}
