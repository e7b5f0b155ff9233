//! Built-in fact list.

pub const FACTS: &[&str] = &[
    "Capybaras are the largest rodents in the world.",
    "An adult capybara can weigh up to 66 kilograms.",
    "Capybaras are native to South America.",
    "The name capybara comes from a Tupi word meaning 'one who eats slender leaves'.",
    "Capybaras are semi-aquatic and have slightly webbed feet.",
    "A capybara can hold its breath underwater for up to five minutes.",
    "Capybaras sometimes sleep in the water, keeping only their noses above the surface.",
    "Capybaras live in groups that usually number between 10 and 20 animals.",
    "Capybaras are herbivores and graze mainly on grasses and aquatic plants.",
    "Capybaras eat their own feces in the morning to digest cellulose more fully.",
    "A capybara's teeth grow continuously throughout its life.",
    "Capybaras communicate with barks, whistles, purrs and clicks.",
    "The closest living relatives of capybaras are guinea pigs and rock cavies.",
    "Capybaras have a lifespan of 8 to 10 years in the wild.",
    "Female capybaras usually give birth to a litter of four pups.",
    "Capybara pups can eat grass within a week of being born.",
    "Birds often perch on capybaras to eat insects off their backs.",
    "Capybaras can run as fast as 35 kilometers per hour over short distances.",
    "The scientific name of the capybara is Hydrochoerus hydrochaeris.",
    "Capybaras have a scent gland on their snout called a morrillo.",
];
