//! Instruction text sent alongside the subject and reference images.

use super::color::ColorVariant;

/// Marker preceding free-text adjustments in the composed instructions
pub const ADJUSTMENTS_MARKER: &str = "Additional User Adjustments:";

/// Branding rules for the hoodie in the selected color
pub fn hoodie_description(color: ColorVariant) -> String {
    let color_name = color.as_str();
    format!(
        "The person MUST be wearing the {color_name} hoodie shown in the second reference image.

BRANDING & DESIGN RULES:
1. **Chest Logo:** \"SKODA\" with \"GCC\" below it on the LEFT CHEST. Keep the text clear and legible.
2. **Sleeve Graphic:** A minimalist electronic circuit line graphic located STRICTLY on the SLEEVE CUFF (wrist area).
   - CRITICAL: Do NOT place any graphics on the shoulder, upper arm, or main body. The shoulder must be clean solid color.
3. **Color:** The hoodie must be {color_name}. Match the reference exactly.
4. **Fit:** Professional, well-fitted office hoodie."
    )
}

/// Full portrait instructions for `color`, with `adjustment` appended when non-empty
pub fn compose_instructions(color: ColorVariant, adjustment: &str) -> String {
    let base = format!(
        "Create a professional corporate MEDIUM SHOT (waist-up) portrait.

INSTRUCTIONS:
1. **Subject:** Use the face from the first image. Preserve facial features, expression, and identity exactly.
2. **Attire:** The person must be wearing the hoodie from the second reference image.
3. **Framing:** WAIST-UP / MEDIUM SHOT.
   - It is CRITICAL to show the shoulders, chest, and upper arms to display the hoodie logo and pockets.
   - Do NOT crop tightly around the face. Zoom out to show the body.
4. **Background:** Professional, bright office environment or clean studio gradient (LinkedIn style).
5. **Lighting:** Soft, professional studio lighting.

{}

High quality, photorealistic, 4k resolution, professional photography.",
        hoodie_description(color)
    );

    if adjustment.is_empty() {
        base
    } else {
        format!("{}\n{} {}", base, ADJUSTMENTS_MARKER, adjustment)
    }
}
