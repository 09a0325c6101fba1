/// A predefined hairstyle the user can pick. Entries are static and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub thumbnail: &'static str,
    pub prompt: &'static str,
}

pub static HAIRSTYLES: [StyleOption; 6] = [
    StyleOption {
        id: "fade-pompadour",
        name: "Executive Pompadour",
        description: "Clean mid-fade with a textured voluminous top.",
        thumbnail: "https://picsum.photos/seed/hair1/300/300",
        prompt: "A classic professional pompadour with a clean mid-fade on the sides. The top has natural texture and volume.",
    },
    StyleOption {
        id: "buzz-cut",
        name: "Precision Buzz",
        description: "Minimalist uniform length with sharp edge-up.",
        thumbnail: "https://picsum.photos/seed/hair2/300/300",
        prompt: "A precise, uniform buzz cut with a sharp surgical edge-up and clean tapered neckline.",
    },
    StyleOption {
        id: "side-part",
        name: "Modern Side Part",
        description: "Sleek professional side part with tapered sides.",
        thumbnail: "https://picsum.photos/seed/hair3/300/300",
        prompt: "A sleek, professional side part hairstyle with a subtle hard part and tapered sides.",
    },
    StyleOption {
        id: "textured-crop",
        name: "Urban Textured Crop",
        description: "Forward-styled fringe with high skin fade.",
        thumbnail: "https://picsum.photos/seed/hair4/300/300",
        prompt: "A modern textured French crop with messy forward-styled fringe and a high skin fade.",
    },
    StyleOption {
        id: "slick-back",
        name: "Classic Slick Back",
        description: "Low-shine traditional slick back with soft taper.",
        thumbnail: "https://picsum.photos/seed/hair5/300/300",
        prompt: "A classic traditional slick back hairstyle with natural flow and soft tapered sides.",
    },
    StyleOption {
        id: "braids-fade",
        name: "Braided Top Fade",
        description: "Intricate braids with a clean drop fade.",
        thumbnail: "https://picsum.photos/seed/hair6/300/300",
        prompt: "Clean, professional box braids on top with a sharp drop fade around the ears and back.",
    },
];

pub fn all_styles() -> &'static [StyleOption] {
    &HAIRSTYLES
}

pub fn find_style(id: &str) -> Option<&'static StyleOption> {
    HAIRSTYLES.iter().find(|style| style.id == id)
}
