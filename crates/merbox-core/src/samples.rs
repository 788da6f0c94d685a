//! Starter diagrams offered by the editor.

pub const DEFAULT_CUSTOM_THEME: &str = r##"{
  "theme": "base",
  "themeVariables": {
    "darkMode": false,
    "background": "#fdf5ff",
    "fontFamily": "SF Pro Display, SF Pro Text, -apple-system, BlinkMacSystemFont, sans-serif",
    "fontSize": "16px",
    "primaryColor": "#ffffff",
    "primaryTextColor": "#2a1b4d",
    "primaryBorderColor": "#d5c2ff",
    "lineColor": "#a86bff",
    "secondaryColor": "#ffe3fa",
    "secondaryBorderColor": "#ffb3e1",
    "secondaryTextColor": "#2a1b4d",
    "tertiaryColor": "#f2ecff",
    "tertiaryBorderColor": "#d8c6ff",
    "tertiaryTextColor": "#7356c4",
    "textColor": "#2a1b4d",
    "mainBkg": "#ffffff",
    "noteBkgColor": "#fff6cf",
    "noteTextColor": "#2a1b4d",
    "clusterBkg": "#f8f0ff",
    "clusterBorder": "#d9c1ff",
    "defaultLinkColor": "#a86bff",
    "titleColor": "#5b3aa4",
    "actorBkg": "#fefbff",
    "actorBorder": "#d5c2ff",
    "actorTextColor": "#2a1b4d",
    "pie1": "#a86bff",
    "pie2": "#ff99e0",
    "pie3": "#ffc861",
    "pieSectionTextColor": "#2a1b4d",
    "fillType0": "#a86bff",
    "fillType1": "#ff99e0",
    "fillType2": "#ffc861",
    "fillType3": "#6ad2ff"
  }
}"##;

pub const SAMPLES: &[(&str, &str)] = &[
    (
        "flowchart",
        "flowchart TD
    A[Start] --> B{Is it?}
    B -->|Yes| C[OK]
    B -->|No| D[End]
    C --> D",
    ),
    (
        "sequence",
        "sequenceDiagram
    participant Alice
    participant Bob
    Alice->>John: Hello John, how are you?
    loop Healthcheck
        John->>John: Fight against hypochondria
    end
    Note right of John: Rational thoughts!
    John-->>Alice: Great!
    John->>Bob: How about you?
    Bob-->>John: Jolly good!",
    ),
    (
        "class",
        "classDiagram
    Animal <|-- Duck
    Animal <|-- Fish
    Animal : +int age
    Animal: +isMammal()
    class Duck{
      +String beakColor
      +swim()
    }
    class Fish{
      -int sizeInFeet
      -canEat()
    }",
    ),
    (
        "state",
        "stateDiagram-v2
    [*] --> Still
    Still --> [*]
    Still --> Moving
    Moving --> Still
    Moving --> Crash
    Crash --> [*]",
    ),
    (
        "er",
        "erDiagram
    CUSTOMER ||--o{ ORDER : places
    ORDER ||--|{ LINE-ITEM : contains
    CUSTOMER }|..|{ DELIVERY-ADDRESS : uses",
    ),
    (
        "journey",
        "journey
    title My working day
    section Go to work
      Make tea: 5: Me
      Go upstairs: 3: Me
      Do work: 1: Me, Cat
    section Go home
      Go downstairs: 5: Me
      Sit down: 5: Me",
    ),
    (
        "gantt",
        "gantt
    title A Gantt Diagram
    dateFormat YYYY-MM-DD
    section Section
        A task          :a1, 2014-01-01, 30d
        Another task    :after a1, 20d
    section Another
        Task in Another :2014-01-12, 12d
        another task    :24d",
    ),
    (
        "pie",
        r#"pie title Pets adopted by volunteers
    "Dogs" : 386
    "Cats" : 85
    "Rats" : 15"#,
    ),
    (
        "mindmap",
        "mindmap
  root((mindmap))
    Origins
      Long history
      Popularisation
        British popular psychology author Tony Buzan
    Research
      On effectiveness<br/>and features
      On Automatic creation
    Tools
      Pen and paper
      Mermaid",
    ),
    (
        "timeline",
        "timeline
    title History of Social Media Platform
    2002 : LinkedIn
    2004 : Facebook
         : Google
    2005 : Youtube
    2006 : Twitter",
    ),
    (
        "gitgraph",
        "gitGraph
    commit
    commit
    branch develop
    checkout develop
    commit
    checkout main
    merge develop
    commit",
    ),
    (
        "kanban",
        "kanban
    Todo
      [Create Diagram]
      [Design UI]
    In Progress
      [Implement Feature]
    Done
      [Testing]",
    ),
];

pub fn sample(key: &str) -> Option<&'static str> {
    SAMPLES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, code)| *code)
}

pub fn sample_keys() -> impl Iterator<Item = &'static str> {
    SAMPLES.iter().map(|(k, _)| *k)
}
