//! The capability table.
//!
//! The loader binds every entry as a free variable of the artifact; the prompt
//! library renders the same table for the model. Both read this slice, so the
//! names a model is told about and the names available at load time match.

use crate::capability::{Capability, CapabilityKind, CapabilitySource};

macro_rules! lesson {
    ($name:literal, $kind:ident, $usage:literal, $summary:literal) => {
        Capability {
            name: $name,
            kind: CapabilityKind::$kind,
            source: CapabilitySource::Lesson,
            usage: $usage,
            summary: $summary,
        }
    };
}

macro_rules! control {
    ($name:literal, $usage:literal, $summary:literal) => {
        Capability {
            name: $name,
            kind: CapabilityKind::Control,
            source: CapabilitySource::Control,
            usage: $usage,
            summary: $summary,
        }
    };
}

pub(crate) const CAPABILITIES: &[Capability] = &[
    lesson!("Box", Layout, "<Box className=\"...\">{children}</Box>", "Plain layout container"),
    lesson!("Text", Typography, "<Text className=\"...\">{children}</Text>", "Body paragraph"),
    lesson!("Card", Layout, "<Card>{children}</Card>", "Dark card with border"),
    lesson!(
        "Callout",
        Feedback,
        "<Callout title=\"...\" type=\"info|warning|success|error\">{children}</Callout>",
        "Highlighted note"
    ),
    lesson!(
        "AnimatedCard",
        Layout,
        "<AnimatedCard delay={0.2}>{children}</AnimatedCard>",
        "Card that fades in"
    ),
    lesson!(
        "Badge",
        Feedback,
        "<Badge variant=\"default|success|warning|error\">Text</Badge>",
        "Inline status label"
    ),
    lesson!("Progress", Feedback, "<Progress value={75} />", "Progress bar"),
    lesson!(
        "Timeline",
        Layout,
        "<Timeline steps={[{title:\"\",desc:\"\"}]} />",
        "Ordered sequence of steps"
    ),
    lesson!(
        "Graph",
        Chart,
        "<Graph data={[]} xKey=\"x\" yKey=\"y\" type=\"line|bar|pie\" height={300} />",
        "Line, bar, or pie chart"
    ),
    lesson!(
        "MathFormula",
        Formula,
        "<MathFormula tex=\"x^2 + y^2 = z^2\" />",
        "LaTeX formula"
    ),
    lesson!(
        "CodeBlock",
        Code,
        "<CodeBlock code=\"...\" language=\"tsx\" />",
        "Highlighted code listing"
    ),
    lesson!(
        "Mermaid",
        Diagram,
        "<Mermaid chart={`graph TD; A-->B;`} />",
        "Mermaid diagram"
    ),
    lesson!(
        "SVGCanvas",
        Chart,
        "<SVGCanvas width={600} height={300}>{children}</SVGCanvas>",
        "Drawing surface for custom SVG"
    ),
    lesson!(
        "Quiz",
        Quiz,
        "<Quiz questions={[]} onComplete={(score)=>{}} />",
        "Multiple-choice quiz with scoring"
    ),
    lesson!(
        "Calculator",
        Calculator,
        "<Calculator formula=\"x+y\" inputs={[]} onResult={(r)=>{}} />",
        "Formula calculator with inputs"
    ),
    control!("Button", "<Button variant=\"default|outline|ghost\">Text</Button>", "Button"),
    control!("Input", "<Input />", "Text input"),
    control!(
        "Slider",
        "<Slider value={[50]} onValueChange={(v)=>setValue(v[0])} min={0} max={100} />",
        "Range slider"
    ),
    control!("Tabs", "<Tabs>", "Tab container"),
    control!("TabsList", "<TabsList>", "Tab header row"),
    control!("TabsTrigger", "<TabsTrigger>", "Tab header"),
    control!("TabsContent", "<TabsContent>", "Tab panel"),
    control!("Accordion", "<Accordion>", "Accordion container"),
    control!("AccordionItem", "<AccordionItem>", "Accordion section"),
    control!("AccordionTrigger", "<AccordionTrigger>", "Accordion header"),
    control!("AccordionContent", "<AccordionContent>", "Accordion body"),
    control!("Select", "<Select>", "Select container"),
    control!("SelectTrigger", "<SelectTrigger>", "Select button"),
    control!("SelectContent", "<SelectContent>", "Select options list"),
    control!("SelectItem", "<SelectItem>", "Select option"),
    control!("Switch", "<Switch checked={} onCheckedChange={} />", "Toggle switch"),
    control!("Label", "<Label>Text</Label>", "Form label"),
];

/// Runtime bindings injected next to the capabilities: the base UI runtime's
/// hooks and fragment, destructured from the runtime object.
pub(crate) const RUNTIME_BINDINGS: &[&str] = &[
    "useState",
    "useEffect",
    "useCallback",
    "useMemo",
    "useRef",
    "useReducer",
    "useContext",
    "Fragment",
];
